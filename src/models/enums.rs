use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_uppercase();
                match upper.as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SectionName {
    History => "HISTORY",
    Technique => "TECHNIQUE",
    Comparison => "COMPARISON",
    Findings => "FINDINGS",
    Impression => "IMPRESSION",
    Recommendation => "RECOMMENDATION",
    Unlabeled => "UNLABELED",
});

str_enum!(TermCategory {
    Anatomy => "ANATOMY",
    Finding => "FINDING",
    Condition => "CONDITION",
    Procedure => "PROCEDURE",
    Measurement => "MEASUREMENT",
    Drug => "DRUG",
    LabValue => "LAB_VALUE",
    Abbreviation => "ABBREVIATION",
});
