use std::str::FromStr;

use access_raptor::Profile;

pub fn parse_profile(raw: &str) -> Profile {
    Profile::from_str(raw.trim()).unwrap_or(Profile::Eld)
}
