use std::sync::Arc;

use maud::{html, Markup};
use tracing::{event, Level};

use crate::{
    api::{ApiClient, LotOrder, LOTS_ENDPOINT},
    dom::Container,
    domain::Lot,
    errors::ViewError,
    metrics::{Outcome, ViewMetrics},
    notifier::Notifier,
};

pub static LOTS_CONTAINER_ID: &str = "row-lotti";
pub static LOAD_FAILED_MESSAGE: &str = "An error occurred while loading the lots. Please try again later.";

/// What the footer of a lot card offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallToAction {
    Suspended,
    SoldOut,
    Reserve { href: String },
}

impl CallToAction {
    pub fn for_lot(lot: &Lot) -> CallToAction {
        if lot.suspended {
            CallToAction::Suspended
        } else if lot.available_quantity <= 0 {
            CallToAction::SoldOut
        } else {
            CallToAction::Reserve {
                href: format!("/lotto/{}", lot.id),
            }
        }
    }

    pub fn render(&self) -> Markup {
        match self {
            CallToAction::Suspended => html! {
                button.btn.btn-danger."w-100" disabled { "Suspended" }
            },
            CallToAction::SoldOut => html! {
                button.btn.btn-warning."w-100" disabled { "Sold out" }
            },
            CallToAction::Reserve { href } => html! {
                a.btn.btn-primary."w-100" href=(href) { "Reserve" }
            },
        }
    }
}

pub struct LotCatalogView<A: ApiClient, N: Notifier> {
    api: Arc<A>,
    notifier: Arc<N>,
    metrics: Arc<ViewMetrics>,
    images_path: String,
    row: Container,
}

impl<A: ApiClient, N: Notifier> LotCatalogView<A, N> {
    pub fn new(api: Arc<A>, notifier: Arc<N>, metrics: Arc<ViewMetrics>, row: Container, images_path: &str) -> Self {
        LotCatalogView {
            api,
            notifier,
            metrics,
            images_path: images_path.trim_end_matches('/').to_string(),
            row,
        }
    }

    /// Fetches the lots newest-delivery first and appends one card per lot.
    /// Cards from earlier loads are kept, so call this once per page.
    pub async fn load(&mut self) -> Result<usize, ViewError> {
        let lots = match self.api.list_lots(LotOrder::Desc).await {
            Ok(lots) => {
                self.metrics.record_request(LOTS_ENDPOINT, Outcome::Success);
                lots
            }
            Err(e) => {
                self.metrics.record_request(LOTS_ENDPOINT, Outcome::Failure);
                event!(Level::ERROR, "Error occurred while loading lots: {}", e);
                self.notifier.alert(LOAD_FAILED_MESSAGE);
                return Err(e.into());
            }
        };

        for lot in &lots {
            event!(Level::DEBUG, "Rendering lot {} ({})", lot.id, lot.product.name);
            self.row.append(self.render_card(lot));
        }

        Ok(lots.len())
    }

    pub fn container(&self) -> &Container {
        &self.row
    }

    pub fn render(&self) -> Markup {
        self.row.render()
    }

    fn render_card(&self, lot: &Lot) -> Markup {
        let producer = lot.product.producer.as_ref().map(|p| p.name.as_str()).unwrap_or_default();

        html! {
            div class="col-lg-4 col-md-4 col-sm-6 my-2 d-flex align-items-stretch" {
                div class="card h-100 d-flex flex-column" {
                    div class="card-header bg-gas-primary" {
                        h4 class="card-title text-gas-primary" { (lot.product.name) }
                        p.text-end { small { "(lot code: " (lot.id) ")" } }
                    }
                    div class="card-body flex-grow-1" {
                        p { "Producer: " b { (producer) } }
                        p { "Delivery date: " b { (lot.delivery_date_label) } }
                        p { "Total qty: " b { (lot.total_quantity) " " (lot.unit_of_measure) } }
                        p { "Available qty: " b { (lot.available_quantity) " " (lot.unit_of_measure) } }
                        p { "Price: " b { (lot.price_label) } }
                    }
                    @if let Some(image) = &lot.product.image {
                        img.rounded.card-img-bottom src=(format!("{}/{}", self.images_path, image)) alt=(lot.product.name);
                    }
                    div.card-footer {
                        (CallToAction::for_lot(lot).render())
                    }
                }
            }
        }
    }
}
