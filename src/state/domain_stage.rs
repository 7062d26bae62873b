/// Stage definitions for tracking one domain through the pipeline
///
/// A domain moves strictly forward through the stages; any stage before
/// `Done` may also jump straight to `Done` when the domain is abandoned.
use std::fmt;

/// Represents where a domain is in the icon discovery pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainStage {
    /// Checking domain syntax
    Validating,

    /// Fetching the home page
    FetchingRoot,

    /// Parsing the home page markup
    Parsing,

    /// Spawning probes for every candidate (HTML, manifest, well-known)
    Discovering,

    /// Waiting for every probe to report
    Collecting,

    /// Choosing the best icon
    Selecting,

    /// Finished, with or without an icon
    Done,
}

impl DomainStage {
    /// Returns true if no further processing happens in this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the stage that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Validating => Some(Self::FetchingRoot),
            Self::FetchingRoot => Some(Self::Parsing),
            Self::Parsing => Some(Self::Discovering),
            Self::Discovering => Some(Self::Collecting),
            Self::Collecting => Some(Self::Selecting),
            Self::Selecting => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Checks whether moving from this stage to `to` is legal
    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Done || self.next() == Some(to)
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::FetchingRoot => "fetching_root",
            Self::Parsing => "parsing",
            Self::Discovering => "discovering",
            Self::Collecting => "collecting",
            Self::Selecting => "selecting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for DomainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
