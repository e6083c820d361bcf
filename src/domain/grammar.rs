use std::{fmt, str::FromStr};

/// The path delimiter separating tokens of a stored key.
pub const DELIMITER: char = '/';

/// The kind of a single segment in a [`Key`](super::Key).
///
/// Each kind has exactly one permitted parent kind (or none, for
/// [`SegmentKind::Domain`]). That relation is the adjacency table shared by
/// the builder and the parser; see [`SegmentKind::parent_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentKind {
    /// A top-level domain.
    Domain,
    /// A subdomain of a domain.
    Subdomain,
    /// A class within a subdomain.
    Class,
    /// A use case within a subdomain.
    UseCase,
    /// A state of a class.
    State,
    /// An action of a class.
    Action,
    /// A guard of a class.
    Guard,
    /// An action fired by a state at one point of its lifecycle.
    StateAction,
}

impl SegmentKind {
    /// Every segment kind, roots first.
    pub const ALL: [Self; 8] = [
        Self::Domain,
        Self::Subdomain,
        Self::Class,
        Self::UseCase,
        Self::State,
        Self::Action,
        Self::Guard,
        Self::StateAction,
    ];

    /// The literal used for this kind in the stored key format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Subdomain => "subdomain",
            Self::Class => "class",
            Self::UseCase => "usecase",
            Self::State => "state",
            Self::Action => "action",
            Self::Guard => "guard",
            Self::StateAction => "saction",
        }
    }

    /// Looks up a kind by its exact stored label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// The kind a segment of this kind must be nested under.
    ///
    /// This is the complete adjacency table. `None` means the kind is only
    /// valid as the first segment of a key.
    #[must_use]
    pub const fn parent_kind(self) -> Option<Self> {
        match self {
            Self::Domain => None,
            Self::Subdomain => Some(Self::Domain),
            Self::Class | Self::UseCase => Some(Self::Subdomain),
            Self::State | Self::Action | Self::Guard => Some(Self::Class),
            Self::StateAction => Some(Self::State),
        }
    }

    /// Whether a key may start with a segment of this kind.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.parent_kind().is_none()
    }

    /// Whether `child` may be nested directly under a segment of this kind.
    #[must_use]
    pub fn accepts(self, child: Self) -> bool {
        child.parent_kind() == Some(self)
    }

    /// The kinds that may be nested directly under this kind.
    pub fn children(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |kind| self.accepts(*kind))
    }

    /// Whether segments of this kind carry a [`Qualifier`].
    #[must_use]
    pub const fn is_qualified(self) -> bool {
        matches!(self, Self::StateAction)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SegmentKind {
    type Err = UnknownKindError;

    /// Parses a kind label, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

/// Error returned when a string is not one of the segment kind labels.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown segment kind '{0}': expected one of domain, subdomain, class, usecase, state, action, guard, saction")]
pub struct UnknownKindError(String);

/// The point in a state's lifecycle at which a state action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Qualifier {
    /// On entering the state.
    Entry,
    /// While in the state.
    Do,
    /// On leaving the state.
    Exit,
}

impl Qualifier {
    /// Every qualifier, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Entry, Self::Do, Self::Exit];

    /// The literal used for this qualifier in the stored key format.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Do => "do",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Qualifier {
    type Err = QualifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let preened = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|qualifier| qualifier.label() == preened)
            .ok_or_else(|| QualifierError::Unknown(s.to_string()))
    }
}

/// Errors concerning the qualifier of a state action.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QualifierError {
    /// The qualifier is not one of `entry`, `do` or `exit`.
    #[error("Unknown qualifier '{0}': expected one of entry, do, exit")]
    Unknown(String),

    /// A state action was requested without an action reference.
    #[error("A {} key requires an action reference and qualifier", SegmentKind::StateAction)]
    Missing,

    /// An action reference was supplied for a kind that takes none.
    #[error("A {0} key does not take an action reference or qualifier")]
    Unexpected(SegmentKind),
}
