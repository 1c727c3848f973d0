use snafu::{ensure, Location, Snafu};

/// Shortest accepted login name, in characters.
pub const MIN_LOGIN_LEN: usize = 3;
/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("simulation length must be between {min} and {max} hours, got {hours}"))]
    HoursOutOfRange {
        hours: u32,
        min: u32,
        max: u32,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("elapsed time must be a positive number of hours, got {hours}"))]
    NonPositiveElapsed {
        hours: f64,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{field} must not be empty"))]
    EmptyField {
        field: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("login must be at least {MIN_LOGIN_LEN} characters long"))]
    LoginTooShort {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("password must be at least {MIN_PASSWORD_LEN} characters long"))]
    PasswordTooShort {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("passwords do not match"))]
    PasswordMismatch {
        #[snafu(implicit)]
        location: Location,
    },
}

/// A requested simulation length, guaranteed to lie in `1..=72` hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimulationHours(u32);

impl SimulationHours {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 72;

    pub fn new(hours: u32) -> Result<Self, ValidationError> {
        ensure!(
            (Self::MIN..=Self::MAX).contains(&hours),
            HoursOutOfRangeSnafu {
                hours,
                min: Self::MIN,
                max: Self::MAX,
            }
        );
        Ok(Self(hours))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl std::fmt::Display for SimulationHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// Elapsed time of a single growth step.
pub fn elapsed_hours(hours: f64) -> Result<f64, ValidationError> {
    ensure!(hours.is_finite() && hours > 0.0, NonPositiveElapsedSnafu { hours });
    Ok(hours)
}

pub fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    ensure!(!trimmed.is_empty(), EmptyFieldSnafu { field });
    Ok(trimmed)
}

/// A filled-in registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub login: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// Checks the form and returns the trimmed login name.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        let login = non_empty("login", &self.login)?;
        ensure!(login.chars().count() >= MIN_LOGIN_LEN, LoginTooShortSnafu);

        ensure!(!self.password.is_empty(), EmptyFieldSnafu { field: "password" });
        ensure!(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            PasswordTooShortSnafu
        );
        ensure!(self.password == self.confirm_password, PasswordMismatchSnafu);

        Ok(login)
    }
}
