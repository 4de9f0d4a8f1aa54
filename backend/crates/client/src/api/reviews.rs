//! `/reviews`

use serde_json::json;
use uuid::Uuid;

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{PageParams, Paged, RatingSummary, Review};

impl ApiClient {
    pub async fn create_review(
        &self,
        booking_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> ClientResult<Review> {
        let body = json!({ "bookingId": booking_id, "rating": rating, "comment": comment });
        self.data(Call::post("/reviews").json(&body)?).await
    }

    /// Approved reviews of a service
    pub async fn service_reviews(
        &self,
        service_id: Uuid,
        page: PageParams,
    ) -> ClientResult<Paged<Review>> {
        self.paged(Call::get(format!("/reviews/service/{service_id}")).query(page.pairs()))
            .await
    }

    /// Written reviews for customers, received reviews for providers
    pub async fn my_reviews(&self, page: PageParams) -> ClientResult<Paged<Review>> {
        self.paged(Call::get("/reviews/my").query(page.pairs())).await
    }

    pub async fn update_review(
        &self,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<&str>,
    ) -> ClientResult<Review> {
        let mut body = serde_json::Map::new();
        if let Some(rating) = rating {
            body.insert("rating".into(), json!(rating));
        }
        if let Some(comment) = comment {
            body.insert("comment".into(), json!(comment));
        }
        self.data(Call::put(format!("/reviews/{id}")).json(&body)?)
            .await
    }

    /// Returns the service rating after removal
    pub async fn delete_review(&self, id: Uuid) -> ClientResult<RatingSummary> {
        self.data(Call::delete(format!("/reviews/{id}"))).await
    }

    pub async fn respond_to_review(&self, id: Uuid, response: &str) -> ClientResult<Review> {
        let body = json!({ "response": response });
        self.data(Call::post(format!("/reviews/{id}/response")).json(&body)?)
            .await
    }
}
