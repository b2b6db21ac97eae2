use std::fmt;

use serde::Serialize;

use super::{error::ClassifyError, features::Label};

/// Label the classifier was trained to emit for genuine articles.
pub const TRUE_LABEL: Label = Label(1);
/// Label the classifier was trained to emit for fabricated articles.
pub const FAKE_LABEL: Label = Label(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Fake,
    True,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Fake => "FAKE",
            Verdict::True => "TRUE",
        }
    }
}

impl TryFrom<Label> for Verdict {
    type Error = ClassifyError;

    fn try_from(label: Label) -> Result<Self, Self::Error> {
        match label {
            TRUE_LABEL => Ok(Verdict::True),
            FAKE_LABEL => Ok(Verdict::Fake),
            other => Err(ClassifyError::UnknownLabel(other)),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_polarity() {
        assert_eq!(Verdict::try_from(Label(1)), Ok(Verdict::True));
        assert_eq!(Verdict::try_from(Label(0)), Ok(Verdict::Fake));
        assert_eq!(
            Verdict::try_from(Label(2)),
            Err(ClassifyError::UnknownLabel(Label(2)))
        );
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::True).unwrap(), "\"TRUE\"");
        assert_eq!(Verdict::Fake.to_string(), "FAKE");
    }
}
