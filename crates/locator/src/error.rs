/// Error type for page interaction.
#[derive(Debug)]
pub struct PageError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl PageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Why locating the parcel key on a page failed.
///
/// All variants mean the scrape target never became usable; callers map
/// them to a single not-found outcome.
#[derive(Debug)]
pub enum LocateError {
    /// No panel selector matched within its wait budget.
    PanelNotFound,
    /// The panel expanded but no key selector matched within its budget.
    KeyNotFound,
    /// A key node matched but its text normalized to nothing.
    EmptyKey,
    /// The page itself failed while interacting with an element.
    Page(PageError),
}

impl std::fmt::Display for LocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocateError::PanelNotFound => write!(f, "cadastral info panel not found on the page"),
            LocateError::KeyNotFound => {
                write!(f, "parcel key link not found after expanding the panel")
            }
            LocateError::EmptyKey => write!(f, "parcel key text is empty after normalization"),
            LocateError::Page(e) => write!(f, "page interaction failed: {e}"),
        }
    }
}

impl std::error::Error for LocateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocateError::Page(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PageError> for LocateError {
    fn from(e: PageError) -> Self {
        LocateError::Page(e)
    }
}
