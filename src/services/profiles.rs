use uuid::Uuid;

use crate::{
    db::Store,
    error::ApiError,
    models::{ProfileUpdate, UpdateProfileRequest, UserProfile},
    services::non_blank,
};

pub async fn get_profile(store: &dyn Store, user_id: Uuid) -> Result<UserProfile, ApiError> {
    store
        .find_user_by_id(user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(ApiError::session_expired)
}

pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> Result<(), ApiError> {
    let (Some(name), Some(phone), Some(dob), Some(gender)) = (
        non_blank(req.name),
        non_blank(req.phone),
        non_blank(req.dob),
        non_blank(req.gender),
    ) else {
        return Err(ApiError::Validation("Data missing".into()));
    };

    let update = ProfileUpdate {
        name,
        phone,
        address: req.address,
        dob,
        gender,
        image: non_blank(req.image),
    };

    if !store.update_profile(user_id, &update).await? {
        return Err(ApiError::session_expired());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::Address;
    use crate::services::fixtures;

    fn full_update() -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: Some("Jane Roe".into()),
            phone: Some("5551234567".into()),
            address: Some(Address {
                line1: "1 Main St".into(),
                line2: "Springfield".into(),
            }),
            dob: Some("1990-04-02".into()),
            gender: Some("Female".into()),
            image: Some("https://img.example/jane.png".into()),
        }
    }

    #[tokio::test]
    async fn new_profile_has_placeholders_and_no_credentials() {
        let store = MemoryStore::new();
        let user = fixtures::patient(&store, "Jane").await;

        let profile = get_profile(&store, user.user_id).await.unwrap();
        assert_eq!(profile.phone, "0000000000");
        assert_eq!(profile.gender, "Not Selected");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "patient");
    }

    #[tokio::test]
    async fn update_profile_persists_fields() {
        let store = MemoryStore::new();
        let user = fixtures::patient(&store, "Jane").await;

        update_profile(&store, user.user_id, full_update()).await.unwrap();

        let profile = get_profile(&store, user.user_id).await.unwrap();
        assert_eq!(profile.name, "Jane Roe");
        assert_eq!(profile.address.line2, "Springfield");
        assert_eq!(profile.image, "https://img.example/jane.png");
    }

    #[tokio::test]
    async fn update_without_image_keeps_avatar() {
        let store = MemoryStore::new();
        let user = fixtures::patient(&store, "Jane").await;
        update_profile(&store, user.user_id, full_update()).await.unwrap();

        let mut req = full_update();
        req.image = None;
        req.phone = Some("5550000000".into());
        update_profile(&store, user.user_id, req).await.unwrap();

        let profile = get_profile(&store, user.user_id).await.unwrap();
        assert_eq!(profile.phone, "5550000000");
        assert_eq!(profile.image, "https://img.example/jane.png");
    }

    #[tokio::test]
    async fn update_without_address_keeps_saved_address() {
        let store = MemoryStore::new();
        let user = fixtures::patient(&store, "Jane").await;
        update_profile(&store, user.user_id, full_update()).await.unwrap();

        let mut req = full_update();
        req.address = None;
        req.name = Some("Jane Q. Roe".into());
        update_profile(&store, user.user_id, req).await.unwrap();

        let profile = get_profile(&store, user.user_id).await.unwrap();
        assert_eq!(profile.name, "Jane Q. Roe");
        assert_eq!(
            profile.address,
            Address {
                line1: "1 Main St".into(),
                line2: "Springfield".into(),
            }
        );
    }

    #[tokio::test]
    async fn update_requires_core_fields() {
        let store = MemoryStore::new();
        let user = fixtures::patient(&store, "Jane").await;

        let mut req = full_update();
        req.dob = Some("   ".into());
        let err = update_profile(&store, user.user_id, req).await.unwrap_err();
        assert_eq!(err.to_string(), "Data missing");
    }
}
