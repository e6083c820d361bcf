use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use super::{
    grammar::{DELIMITER, Qualifier, QualifierError, SegmentKind, UnknownKindError},
    name::{InvalidNameError, LocalName},
};

/// One `(kind, local name)` pair of a key's chain.
///
/// State action segments also carry their [`Qualifier`]; for every other kind
/// the qualifier is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    kind: SegmentKind,
    qualifier: Option<Qualifier>,
    name: LocalName,
}

impl Segment {
    /// The kind of this segment.
    #[must_use]
    pub const fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// The lifecycle qualifier, for state action segments.
    #[must_use]
    pub const fn qualifier(&self) -> Option<Qualifier> {
        self.qualifier
    }

    /// The preened local name.
    #[must_use]
    pub const fn name(&self) -> &LocalName {
        &self.name
    }

}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{DELIMITER}", self.kind)?;
        if let Some(qualifier) = self.qualifier {
            write!(f, "{qualifier}{DELIMITER}")?;
        }
        f.write_str(&self.name)
    }
}

/// Renders a chain of segments in the stored key format.
struct Chain<'a>(&'a NonEmpty<Segment>);

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "{DELIMITER}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// The action a state action fires, and when it fires.
///
/// Required by [`Key::build`] for [`SegmentKind::StateAction`] keys only.
#[derive(Debug, Clone, Copy)]
pub struct ActionRef<'a> {
    /// An action key belonging to the same class as the parent state.
    pub action: &'a Key,
    /// One of `entry`, `do` or `exit`.
    pub qualifier: &'a str,
}

/// A hierarchical key identifying one entity of the requirements model.
///
/// A key is the chain of segments from its domain down to the entity itself.
/// It can only be obtained from the builder ([`Key::build`] and the `new_*`
/// constructors) or the parser ([`FromStr`]), both of which preen their input
/// and enforce the adjacency table, so every `Key` is canonical.
///
/// Equality, ordering and hashing are those of the canonical string returned
/// by [`Key::as_str`].
///
/// # Examples
///
/// ```
/// use reqmodel::Key;
///
/// let domain = Key::new_domain("Domain_Key").unwrap();
/// let subdomain = Key::new_subdomain(&domain, " subdomain_key ").unwrap();
/// assert_eq!(subdomain.as_str(), "domain/domain_key/subdomain/subdomain_key");
///
/// let parsed: Key = "DOMAIN/domain_key/subdomain/Subdomain_Key".parse().unwrap();
/// assert_eq!(parsed, subdomain);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    segments: NonEmpty<Segment>,
    canonical: String,
}

impl Key {
    fn from_segments(segments: NonEmpty<Segment>) -> Self {
        let canonical = Chain(&segments).to_string();
        Self {
            segments,
            canonical,
        }
    }

    /// Builds a key of the given kind under `parent`.
    ///
    /// `local_name` is preened before it is validated. `action` must be
    /// supplied for [`SegmentKind::StateAction`] and only for that kind.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParent`] if `parent` is not of the kind `kind` nests
    ///   under (or is missing, or is present for a domain), or if the action
    ///   reference is not an action of the state's class
    /// - [`Error::InvalidQualifier`] if the qualifier is unknown, missing, or
    ///   supplied for a kind that takes none
    /// - [`Error::InvalidLocalName`] if the preened name is empty or contains
    ///   a character outside `[a-z0-9_-]`
    pub fn build(
        kind: SegmentKind,
        parent: Option<&Self>,
        local_name: &str,
        action: Option<ActionRef<'_>>,
    ) -> Result<Self, Error> {
        let parent_kind = parent.map(Self::kind);
        if kind.parent_kind() != parent_kind {
            return Err(ParentError::Mismatch {
                kind,
                parent: parent_kind,
            }
            .into());
        }

        let qualifier = match (action, parent) {
            (Some(action), Some(state)) if kind.is_qualified() => {
                let qualifier = action.qualifier.parse::<Qualifier>()?;
                if action.action.kind() != SegmentKind::Action
                    || !action.action.is_sibling_of(state)
                {
                    return Err(ParentError::ForeignAction {
                        action: action.action.to_string(),
                        state: state.to_string(),
                    }
                    .into());
                }
                Some(qualifier)
            }
            (None, _) if kind.is_qualified() => return Err(QualifierError::Missing.into()),
            (Some(_), _) => return Err(QualifierError::Unexpected(kind).into()),
            _ => None,
        };

        let segment = Segment {
            kind,
            qualifier,
            name: LocalName::new(local_name)?,
        };

        let Some(parent) = parent else {
            return Ok(Self::from_segments(NonEmpty::new(segment)));
        };
        let mut segments = parent.segments.clone();
        segments.push(segment);
        Ok(Self::from_segments(segments))
    }

    /// Builds a key from a kind label such as `"class"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKind`] if `kind` is not a segment kind label,
    /// and otherwise fails exactly as [`Key::build`].
    pub fn build_labelled(
        kind: &str,
        parent: Option<&Self>,
        local_name: &str,
        action: Option<ActionRef<'_>>,
    ) -> Result<Self, Error> {
        Self::build(kind.parse::<SegmentKind>()?, parent, local_name, action)
    }

    /// Builds a domain key.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid local name.
    pub fn new_domain(name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::Domain, None, name, None)
    }

    /// Builds a subdomain key under a domain key.
    ///
    /// # Errors
    ///
    /// Returns an error if `domain` is not a domain key or `name` is invalid.
    pub fn new_subdomain(domain: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::Subdomain, Some(domain), name, None)
    }

    /// Builds a class key under a subdomain key.
    ///
    /// # Errors
    ///
    /// Returns an error if `subdomain` is not a subdomain key or `name` is
    /// invalid.
    pub fn new_class(subdomain: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::Class, Some(subdomain), name, None)
    }

    /// Builds a use case key under a subdomain key.
    ///
    /// # Errors
    ///
    /// Returns an error if `subdomain` is not a subdomain key or `name` is
    /// invalid.
    pub fn new_use_case(subdomain: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::UseCase, Some(subdomain), name, None)
    }

    /// Builds a state key under a class key.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not a class key or `name` is invalid.
    pub fn new_state(class: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::State, Some(class), name, None)
    }

    /// Builds an action key under a class key.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not a class key or `name` is invalid.
    pub fn new_action(class: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::Action, Some(class), name, None)
    }

    /// Builds a guard key under a class key.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not a class key or `name` is invalid.
    pub fn new_guard(class: &Self, name: &str) -> Result<Self, Error> {
        Self::build(SegmentKind::Guard, Some(class), name, None)
    }

    /// Builds a state action key, firing `action` at the `qualifier` point of
    /// `state`'s lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` is not a state key, `action` is not an
    /// action of the same class, or `name` is invalid.
    pub fn new_state_action(
        state: &Self,
        action: &Self,
        qualifier: Qualifier,
        name: &str,
    ) -> Result<Self, Error> {
        Self::build(
            SegmentKind::StateAction,
            Some(state),
            name,
            Some(ActionRef {
                action,
                qualifier: qualifier.label(),
            }),
        )
    }

    /// Parses a stored key string.
    ///
    /// Tokens are preened individually, so surrounding whitespace and case
    /// are not significant.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedKey`] if the input is blank, has an empty token, has
    ///   an unknown kind label, or ends with a label that has no value
    /// - [`Error::InvalidParent`] if the chain does not start with a domain or
    ///   breaks the adjacency table
    /// - [`Error::InvalidQualifier`] if a state action qualifier is unknown
    /// - [`Error::InvalidLocalName`] if a value contains a character outside
    ///   `[a-z0-9_-]`
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let malformed = |reason| MalformedKeyError {
            key: raw.to_string(),
            reason,
        };

        if raw.trim().is_empty() {
            return Err(malformed(Malformed::Blank).into());
        }
        if let Some(position) = raw.split(DELIMITER).position(|t| t.trim().is_empty()) {
            return Err(malformed(Malformed::EmptyToken(position)).into());
        }

        let mut tokens = raw.split(DELIMITER);
        let mut segments: Vec<Segment> = Vec::new();

        while let Some(label) = tokens.next() {
            let label = label.trim().to_ascii_lowercase();
            let kind = SegmentKind::from_label(&label)
                .ok_or_else(|| malformed(Malformed::UnknownLabel(label.clone())))?;

            let parent = segments.last().map(Segment::kind);
            if kind.parent_kind() != parent {
                return Err(ParentError::Mismatch { kind, parent }.into());
            }

            let qualifier = if kind.is_qualified() {
                let token = tokens
                    .next()
                    .ok_or_else(|| malformed(Malformed::MissingValue(kind)))?;
                Some(token.parse::<Qualifier>()?)
            } else {
                None
            };

            let value = tokens
                .next()
                .ok_or_else(|| malformed(Malformed::MissingValue(kind)))?;

            segments.push(Segment {
                kind,
                qualifier,
                name: LocalName::new(value)?,
            });
        }

        let segments = NonEmpty::from_vec(segments).ok_or_else(|| malformed(Malformed::Blank))?;
        Ok(Self::from_segments(segments))
    }

    /// The canonical stored form of this key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The kind of the entity this key identifies.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.leaf().kind
    }

    /// The preened local name of the entity this key identifies.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.leaf().name.as_str()
    }

    /// The lifecycle qualifier, if this is a state action key.
    #[must_use]
    pub fn qualifier(&self) -> Option<Qualifier> {
        self.leaf().qualifier
    }

    /// The last segment of the chain.
    #[must_use]
    pub fn leaf(&self) -> &Segment {
        self.segments.last()
    }

    /// The segments of the chain, root first.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// The number of segments in the chain. A domain key has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The key of the enclosing entity, or `None` for a domain key.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.prefix(self.depth() - 1)
    }

    /// The key of the given kind on this key's chain.
    ///
    /// This is the key itself when `kind` is its own kind; for example the
    /// class of a state action is `ancestor(SegmentKind::Class)`.
    #[must_use]
    pub fn ancestor(&self, kind: SegmentKind) -> Option<Self> {
        let position = self.segments.iter().position(|s| s.kind == kind)?;
        self.prefix(position + 1)
    }

    /// The keys of all enclosing entities, domain first.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..self.depth()).filter_map(|len| self.prefix(len))
    }

    /// Whether `other` is nested (at any depth) under this key.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.depth() > self.depth()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    fn is_sibling_of(&self, other: &Self) -> bool {
        self.depth() == other.depth()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .take(self.depth() - 1)
                .all(|(a, b)| a == b)
    }

    fn prefix(&self, len: usize) -> Option<Self> {
        let segments = self.segments.iter().take(len).cloned().collect();
        NonEmpty::from_vec(segments).map(Self::from_segments)
    }
}

/// Canonicalizes a whole key string.
///
/// This is the form every storage predicate and index must use. It is
/// idempotent, and inputs differing only by case or by whitespace around
/// tokens produce the same output.
///
/// # Errors
///
/// Fails exactly as [`Key::parse`].
pub fn preen_key(raw: &str) -> Result<String, Error> {
    Key::parse(raw).map(String::from)
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Key").field(&self.canonical).finish()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.canonical
    }
}

/// Errors that can occur while building or parsing a [`Key`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The kind label is not one of the segment kinds.
    #[error(transparent)]
    InvalidKind(#[from] UnknownKindError),

    /// The chain breaks the parent/child adjacency table.
    #[error(transparent)]
    InvalidParent(#[from] ParentError),

    /// A local name is empty or contains a disallowed character.
    #[error(transparent)]
    InvalidLocalName(#[from] InvalidNameError),

    /// A state action qualifier is unknown, missing or unexpected.
    #[error(transparent)]
    InvalidQualifier(#[from] QualifierError),

    /// The key string does not follow the stored key format.
    #[error(transparent)]
    MalformedKey(#[from] MalformedKeyError),
}

/// A segment placed under the wrong kind of parent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParentError {
    /// `kind` does not nest under `parent` (`None` meaning no parent).
    #[error("{}", describe_mismatch(*.kind, *.parent))]
    Mismatch {
        /// The kind being placed.
        kind: SegmentKind,
        /// The kind of the parent it was placed under.
        parent: Option<SegmentKind>,
    },

    /// A state action references an action outside its state's class.
    #[error("Action '{action}' does not belong to the class of state '{state}'")]
    ForeignAction {
        /// The referenced action key.
        action: String,
        /// The parent state key.
        state: String,
    },
}

fn describe_mismatch(kind: SegmentKind, parent: Option<SegmentKind>) -> String {
    match (kind.parent_kind(), parent) {
        (None, Some(parent)) => format!("A {kind} key cannot be nested under a {parent} key"),
        (Some(expected), None) => format!("A {kind} key must be nested under a {expected} key"),
        (Some(expected), Some(parent)) => {
            format!("A {kind} key must be nested under a {expected} key, not a {parent} key")
        }
        (None, None) => format!("A {kind} key is misplaced"),
    }
}

/// Error returned when a string does not follow the stored key format.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Malformed key '{key}': {reason}")]
pub struct MalformedKeyError {
    key: String,
    reason: Malformed,
}

impl MalformedKeyError {
    /// What is wrong with the key.
    #[must_use]
    pub const fn reason(&self) -> &Malformed {
        &self.reason
    }
}

/// The structural fault found in a malformed key.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Malformed {
    /// The key is empty or only whitespace.
    #[error("key is blank")]
    Blank,

    /// Two delimiters are adjacent, or the key starts or ends with one.
    #[error("token {0} is empty")]
    EmptyToken(usize),

    /// A kind label position holds something else.
    #[error("unknown kind label '{0}'")]
    UnknownLabel(String),

    /// The key ends after a kind label.
    #[error("'{0}' label has no value")]
    MissingValue(SegmentKind),
}
