//! Model selector shared by every surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two pretrained OCR configurations a session can run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelOption {
    /// English or Hindi text, runs on the CPU.
    #[default]
    EnglishHindiCpu,

    /// English text, bound to an accelerator.
    EnglishGpu,
}

impl ModelOption {
    /// All options, in selector order.
    pub const ALL: [ModelOption; 2] = [ModelOption::EnglishHindiCpu, ModelOption::EnglishGpu];

    /// Label shown in the model selector.
    pub fn label(self) -> &'static str {
        match self {
            ModelOption::EnglishHindiCpu => "OCR for English or Hindi (CPU)",
            ModelOption::EnglishGpu => "OCR for English (GPU)",
        }
    }

    /// Stable identifier used on the wire and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            ModelOption::EnglishHindiCpu => "english_hindi_cpu",
            ModelOption::EnglishGpu => "english_gpu",
        }
    }
}

impl fmt::Display for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a selector string names neither model option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown model option '{0}' (expected one of: english_hindi_cpu, english_gpu)")]
pub struct UnknownModelOption(pub String);

impl FromStr for ModelOption {
    type Err = UnknownModelOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        for option in ModelOption::ALL {
            if needle.eq_ignore_ascii_case(option.label())
                || needle.eq_ignore_ascii_case(option.id())
            {
                return Ok(option);
            }
        }

        if needle.eq_ignore_ascii_case("cpu") {
            Ok(ModelOption::EnglishHindiCpu)
        } else if needle.eq_ignore_ascii_case("gpu") {
            Ok(ModelOption::EnglishGpu)
        } else {
            Err(UnknownModelOption(s.to_string()))
        }
    }
}
