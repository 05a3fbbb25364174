/// Digests of the accepted passcodes.
///
/// Entries are trimmed and lower-cased once, so membership is a plain string
/// comparison against the lower-cased digest of what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    digests: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(digests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            digests: digests
                .into_iter()
                .map(|digest| digest.as_ref().trim().to_lowercase())
                .filter(|digest| !digest.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, digest: &str) -> bool {
        self.digests.iter().any(|accepted| accepted == digest)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }
}
