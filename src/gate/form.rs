use secrecy::SecretString;

/// What the login form currently holds.
#[derive(Debug, Clone)]
pub struct FormState {
    pub passcode: SecretString,
    pub remember: bool,
}

impl Default for FormState {
    // the remember toggle starts checked
    fn default() -> Self {
        Self {
            passcode: SecretString::from(String::new()),
            remember: true,
        }
    }
}

impl FormState {
    pub fn new(passcode: impl Into<String>, remember: bool) -> Self {
        Self {
            passcode: SecretString::from(passcode.into()),
            remember,
        }
    }
}
