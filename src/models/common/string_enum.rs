/// Declares a fieldless enum persisted and transmitted as a lowercase string.
///
/// Generates the string constants, `as_str`, `Display`, `FromStr`, serde
/// support and an `ALL` slice listing every variant.
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            /// Comma separated list of accepted values.
            pub fn choices() -> String {
                [$($value,)+].join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(
                        "Invalid {}: '{}'. Expected one of: {}",
                        stringify!($name),
                        s,
                        $name::choices()
                    )),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::string_enum! {
        pub enum Colour {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("red".parse::<Colour>(), Ok(Colour::Red));
        assert_eq!(" Dark_Blue ".parse::<Colour>(), Ok(Colour::DarkBlue));
        assert_eq!(Colour::DarkBlue.to_string(), "dark_blue");
        assert!("green".parse::<Colour>().is_err());
        assert_eq!(Colour::ALL.len(), 2);
        assert_eq!(Colour::choices(), "red, dark_blue");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Colour::Red).unwrap();
        assert_eq!(json, "\"red\"");
        let back: Colour = serde_json::from_str("\"dark_blue\"").unwrap();
        assert_eq!(back, Colour::DarkBlue);
        assert!(serde_json::from_str::<Colour>("\"pink\"").is_err());
    }
}
