use crate::{
    db_types::{Member, NewMember},
    traits::{CompensationDatabase, MemberApiError, RegistrationError},
};

/// Member registration and the lookups a signup form needs.
#[derive(Debug, Clone)]
pub struct RegistrationApi<B> {
    db: B,
}

impl<B> RegistrationApi<B>
where B: CompensationDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Registers a new member. The member is created unplaced; tree placement is a separate,
    /// explicit step via [`TreeApi`](crate::api::TreeApi).
    pub async fn register(&self, new_member: NewMember) -> Result<Member, RegistrationError> {
        self.db.register_member(new_member).await
    }

    /// Resolves a sponsor reference as entered on a signup form: a member number first, then a
    /// raw internal id as a fallback.
    pub async fn resolve_sponsor(&self, sponsor: &str) -> Result<Member, RegistrationError> {
        if let Some(member) = self.db.fetch_member_by_number(sponsor).await? {
            return Ok(member);
        }
        if let Ok(id) = sponsor.parse::<i64>() {
            if let Some(member) = self.db.fetch_member(id).await? {
                return Ok(member);
            }
        }
        Err(RegistrationError::SponsorNotFound(sponsor.to_string()))
    }

    pub async fn email_available(&self, email: &str) -> Result<bool, MemberApiError> {
        Ok(self.db.fetch_member_by_email(email).await?.is_none())
    }

    pub async fn phone_available(&self, phone: &str) -> Result<bool, MemberApiError> {
        Ok(self.db.fetch_member_by_phone(phone).await?.is_none())
    }

    pub async fn national_id_available(&self, national_id: &str) -> Result<bool, MemberApiError> {
        Ok(self.db.fetch_member_by_national_id(national_id).await?.is_none())
    }
}
