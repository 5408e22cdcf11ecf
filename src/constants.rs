/// Storage format for show dates (`2023-11-30 21:00:00`).
pub const SHOW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub mod session {

    pub const USER_KEY: &str = "user";

    pub const PENDING_TOTP_KEY: &str = "pending_totp_secret";
}

pub mod limits {

    pub const MIN_NAME_LENGTH: usize = 3;

    pub const MAX_NAME_LENGTH: usize = 200;

    pub const MAX_EMAIL_LENGTH: usize = 254;
}

pub mod totp {

    pub const STEP_SECONDS: u64 = 30;

    pub const DIGITS: u32 = 6;

    /// 160-bit secrets, the RFC 4226 recommendation.
    pub const SECRET_BYTES: usize = 20;
}
