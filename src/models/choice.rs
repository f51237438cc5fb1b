//! Fixed value sets used by the lead-capture forms.
//!
//! Every enumeration carries its wire value (what the backend stores), a
//! human label for selects and badges, and optional legacy aliases accepted
//! on read.

/// Common surface of the enumerated form fields.
pub trait Choice: Sized + Copy + 'static {
    /// `(wire value, label)` pairs in display order
    const OPTIONS: &'static [(&'static str, &'static str)];

    fn as_str(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn all() -> &'static [Self];
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident = $wire:literal $(| $alias:literal)* => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $crate::models::Choice for $name {
            const OPTIONS: &'static [(&'static str, &'static str)] = &[$(($wire, $label)),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::models::Choice::as_str(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire $(| $alias)* => Ok(Self::$variant),)+
                    other => Err(format!("Unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub(crate) use choice_enum;
