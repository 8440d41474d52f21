use crate::mapping::{Attributes, Entity, FieldSpec, MappingError, Value};

use super::base::BaseEntity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEntity {
    base: BaseEntity,
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
}

impl UserEntity {
    pub fn new(base: BaseEntity) -> Self {
        Self {
            base,
            mobile_phone_number: None,
            email: None,
            nickname: None,
            head_img_url: None,
        }
    }

    pub fn base(&self) -> &BaseEntity {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    pub fn id(&self) -> &str {
        self.base.id()
    }
}

impl Entity for UserEntity {
    const TABLE: &'static str = "user";

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("mobile_phone_number", "varchar").nullable(),
            FieldSpec::new("email", "varchar").nullable(),
            FieldSpec::new("nickname", "varchar").nullable(),
            FieldSpec::new("head_img_url", "varchar").nullable(),
        ]
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "mobile_phone_number" => Some(self.mobile_phone_number.clone().into()),
            "email" => Some(self.email.clone().into()),
            "nickname" => Some(self.nickname.clone().into()),
            "head_img_url" => Some(self.head_img_url.clone().into()),
            _ => self.base.attribute(name),
        }
    }

    fn from_attributes(attributes: &Attributes) -> Result<Self, MappingError> {
        Ok(Self {
            base: BaseEntity::from_attributes(attributes)?,
            mobile_phone_number: attributes.optional("mobile_phone_number")?,
            email: attributes.optional("email")?,
            nickname: attributes.optional("nickname")?,
            head_img_url: attributes.optional("head_img_url")?,
        })
    }
}
