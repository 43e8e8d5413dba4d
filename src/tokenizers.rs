// src/tokenizers.rs

//! Token count estimates for mimeograms

use crate::config::TokenizersConfig;
use crate::error::{Error, Result};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Estimation strategy of the approximate tokenizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ApproximateVariant {
    /// About four characters per token
    #[default]
    Characters,
    /// About three words per four tokens
    Words,
}

/// Token counter selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    Approximate(ApproximateVariant),
}

impl Tokenizer {
    /// Build from a tokenizer name and optional variant
    pub fn from_config(name: &str, variant: Option<&str>) -> Result<Self> {
        let invalid = || Error::TokenizerVariantInvalidity {
            name: name.to_string(),
            variant: variant.unwrap_or_default().to_string(),
        };
        match name {
            "approximate" => {
                let variant = match variant {
                    Some(v) => ApproximateVariant::from_str(v).map_err(|_| invalid())?,
                    None => ApproximateVariant::default(),
                };
                Ok(Self::Approximate(variant))
            }
            _ => Err(invalid()),
        }
    }

    /// Build from the `[tokenizers]` section
    pub fn from_section(section: &TokenizersConfig) -> Result<Self> {
        Self::from_config(&section.default, section.variant.as_deref())
    }

    /// Estimated number of tokens in `text`
    pub fn count(&self, text: &str) -> usize {
        match self {
            Self::Approximate(ApproximateVariant::Characters) => text.chars().count().div_ceil(4),
            Self::Approximate(ApproximateVariant::Words) => {
                (text.split_whitespace().count() * 4).div_ceil(3)
            }
        }
    }
}
