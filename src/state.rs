use std::sync::Arc;

use crate::{
    api::ApiClient,
    catalog::{LotCatalogView, LOTS_CONTAINER_ID},
    dom::Container,
    metrics::ViewMetrics,
    notifier::Notifier,
    reservations::{ReservationListView, RESERVATIONS_CONTAINER_ID},
};

pub struct AppState<A: ApiClient, N: Notifier> {
    pub api: Arc<A>,
    pub notifier: Arc<N>,
    pub metrics: Arc<ViewMetrics>,
    pub static_images_path: String,
}

impl<A: ApiClient, N: Notifier> AppState<A, N> {
    pub fn catalog_view(&self) -> LotCatalogView<A, N> {
        LotCatalogView::new(
            self.api.clone(),
            self.notifier.clone(),
            self.metrics.clone(),
            Container::new(LOTS_CONTAINER_ID).with_class("row"),
            &self.static_images_path,
        )
    }

    pub fn reservation_view(&self) -> ReservationListView<A, N> {
        ReservationListView::new(
            self.api.clone(),
            self.notifier.clone(),
            self.metrics.clone(),
            Container::new(RESERVATIONS_CONTAINER_ID),
        )
    }
}
