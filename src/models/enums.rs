use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $s)]
                $variant
            ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    /// Completed and Cancelled admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

str_enum!(Periodicity {
    Days => "days",
    Weeks => "weeks",
    Months => "months",
    Years => "years",
});

impl Periodicity {
    /// Stable numeric code used in storage and by external callers.
    pub fn code(&self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 2,
            Self::Months => 3,
            Self::Years => 4,
        }
    }

    /// Inverse of [`Periodicity::code`]. No fifth value is accepted.
    pub fn from_code(code: i64) -> Result<Self, DatabaseError> {
        match code {
            1 => Ok(Self::Days),
            2 => Ok(Self::Weeks),
            3 => Ok(Self::Months),
            4 => Ok(Self::Years),
            _ => Err(DatabaseError::InvalidEnum {
                field: "Periodicity".into(),
                value: code.to_string(),
            }),
        }
    }
}

str_enum!(Sex {
    Male => "M",
    Female => "F",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Scheduled, "scheduled"),
            (AppointmentStatus::Completed, "completed"),
            (AppointmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn periodicity_round_trip() {
        for (variant, s) in [
            (Periodicity::Days, "days"),
            (Periodicity::Weeks, "weeks"),
            (Periodicity::Months, "months"),
            (Periodicity::Years, "years"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Periodicity::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn periodicity_codes_map_one_to_one() {
        for (variant, code) in [
            (Periodicity::Days, 1),
            (Periodicity::Weeks, 2),
            (Periodicity::Months, 3),
            (Periodicity::Years, 4),
        ] {
            assert_eq!(variant.code(), code);
            assert_eq!(Periodicity::from_code(code).unwrap(), variant);
        }
    }

    #[test]
    fn periodicity_rejects_unknown_codes() {
        assert!(Periodicity::from_code(0).is_err());
        assert!(Periodicity::from_code(5).is_err());
        assert!(Periodicity::from_code(-1).is_err());
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(AppointmentStatus::from_str("done").is_err());
        assert!(Periodicity::from_str("fortnights").is_err());
        assert!(Sex::from_str("x").is_err());
    }
}
