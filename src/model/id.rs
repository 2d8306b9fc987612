use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use bson::oid::{self, ObjectId};
use rocket::{
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Formatter as UriFormatter, Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};

/// An opaque identifier for surveys and responses.
///
/// Serializes as its 24-character hex string rather than bson's nested
/// `{"$oid": ...}` form, so it reads the same in paths and JSON bodies.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Id(ObjectId);

impl Id {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Id {
    type Target = ObjectId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Id {
    type Err = oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ObjectId::parse_str(s)?))
    }
}

impl From<ObjectId> for Id {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl TryFrom<String> for Id {
    type Error = oid::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_hex()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = oid::Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

impl UriDisplay<Path> for Id {
    fn fmt(&self, f: &mut UriFormatter<'_, Path>) -> std::fmt::Result {
        f.write_value(self.to_hex())
    }
}

impl_from_uri_param_identity!([Path] Id);
