use serde::{Deserialize, Serialize};

use crate::error::{config_error, EmbedResult};

/// A named set of preprocessor defines producing one compiled form of a shader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,

    /// Compiler flags, passed through as-is (e.g. `-DUV_ATTRIB=1`)
    #[serde(default)]
    pub defines: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, defines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            defines: defines.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `name=DEF[,DEF...]` as given on the command line.
    ///
    /// Defines without a leading `-D` get one. A bare `name` yields a
    /// variant with no defines.
    pub fn parse(spec: &str) -> EmbedResult<Self> {
        let (name, defines) = match spec.split_once('=') {
            Some((name, rest)) => (name, rest),
            None => (spec, ""),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(config_error(format!("variant '{}' has no name", spec)));
        }

        let defines = defines
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                if d.starts_with("-D") {
                    d.to_string()
                } else {
                    format!("-D{}", d)
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            defines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defines() {
        let variant = Variant::parse("uint8=VOLUME_DTYPE=uint,-DUINT8_VOLUME=1").unwrap();
        assert_eq!(variant.name, "uint8");
        assert_eq!(
            variant.defines,
            vec!["-DVOLUME_DTYPE=uint".to_string(), "-DUINT8_VOLUME=1".to_string()]
        );
    }

    #[test]
    fn test_parse_bare_name() {
        let variant = Variant::parse("pos").unwrap();
        assert_eq!(variant, Variant::new("pos", Vec::<String>::new()));

        let trailing = Variant::parse("pos=").unwrap();
        assert!(trailing.defines.is_empty());
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!(Variant::parse("=-DX=1").is_err());
        assert!(Variant::parse("").is_err());
    }
}
