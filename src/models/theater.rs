use serde::Serialize;

use crate::entities::theaters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theater {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
}

impl From<theaters::Model> for Theater {
    fn from(model: theaters::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            capacity: model.capacity,
        }
    }
}
