//! `/services`

use uuid::Uuid;

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{
    Category, NewService, PageParams, Paged, Service, ServiceChanges, ServiceDetail, ServiceQuery,
};

impl ApiClient {
    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.data(Call::get("/services/categories")).await
    }

    pub async fn list_services(&self, query: &ServiceQuery) -> ClientResult<Paged<Service>> {
        self.paged(Call::get("/services").query(query.pairs())).await
    }

    /// Service with its latest approved reviews
    pub async fn get_service(&self, id: Uuid, lang: Option<&str>) -> ClientResult<ServiceDetail> {
        let pairs = lang.map(|l| vec![("lang", l.to_string())]).unwrap_or_default();
        self.data(Call::get(format!("/services/{id}")).query(pairs))
            .await
    }

    /// Provider's own services, inactive ones included
    pub async fn my_services(&self, page: PageParams) -> ClientResult<Paged<Service>> {
        self.paged(Call::get("/services/my").query(page.pairs())).await
    }

    pub async fn create_service(&self, service: &NewService) -> ClientResult<Service> {
        self.data(Call::post("/services").json(service)?).await
    }

    pub async fn update_service(
        &self,
        id: Uuid,
        changes: &ServiceChanges,
    ) -> ClientResult<Service> {
        self.data(Call::put(format!("/services/{id}")).json(changes)?)
            .await
    }

    /// Returns the server message; services with open bookings are only deactivated
    pub async fn delete_service(&self, id: Uuid) -> ClientResult<Option<String>> {
        self.message(Call::delete(format!("/services/{id}"))).await
    }
}
