use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use maud::{html, Markup};
use tokio::sync::Mutex;
use tracing::{event, Level};

use crate::{
    api::{ApiClient, DELETE_RESERVATION_ENDPOINT, RESERVATIONS_ENDPOINT, UPDATE_RESERVATION_ENDPOINT},
    dom::{Container, Visibility},
    domain::Reservation,
    errors::{ApiError, ViewError},
    metrics::{Outcome, ViewMetrics},
    notifier::Notifier,
};

pub static RESERVATIONS_CONTAINER_ID: &str = "prenotazioni-container";
pub static NO_RESERVATIONS_MESSAGE_ID: &str = "no-prenotazioni-message";
pub static TOTAL_PRICE_ID: &str = "total-price";

pub static LOAD_FAILED_MESSAGE: &str = "An error occurred while loading your reservations. Please try again later.";
pub static UPDATE_FAILED_MESSAGE: &str = "An error occurred while updating the quantity. Please try again later.";
pub static DELETE_FAILED_MESSAGE: &str = "An error occurred while deleting the reservation. Please try again later.";
pub static INVALID_QUANTITY_MESSAGE: &str = "Please enter a valid number greater than zero.";
pub static DELETE_CONFIRMATION: &str = "Are you sure you want to delete this reservation?";

/// Two decimals with half-cent ties rounded away from zero.
pub fn format_euros(amount: f64) -> String {
    format!("{:.2} €", (amount * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardState {
    Display,
    Editing { input: String },
}

#[derive(Debug, Clone)]
pub struct ReservationCard {
    reservation: Reservation,
    state: CardState,
}

impl ReservationCard {
    fn new(reservation: Reservation) -> Self {
        ReservationCard {
            reservation,
            state: CardState::Display,
        }
    }

    pub fn render(&self) -> Markup {
        let id = self.reservation.id;
        let lot = &self.reservation.lot;
        let (display, edit_input) = match &self.state {
            CardState::Display => (Visibility::Shown, None),
            CardState::Editing { input } => (Visibility::Hidden, Some(input)),
        };

        html! {
            div.card."mb-3" id=(format!("prenotazione-{}", id)) {
                div.card-body {
                    h5.card-title { (lot.product.name) }
                    p.card-text {
                        "Delivery date: " (lot.delivery_date.format("%d/%m/%Y").to_string()) br;
                        "Unit price: " (lot.unit_price) " €" br;
                        "Quantity: " span id=(format!("quantity-{}", id)) style=[display.style()] { (self.reservation.quantity) } br;
                        "Subtotal: " (format_euros(self.reservation.subtotal()))
                    }
                    div.btn-group."mt-2" style=[display.style()] {
                        button.btn.btn-primary data-action="edit" data-id=(id) { "Modify" }
                        button.btn.btn-danger data-action="delete" data-id=(id) { "Delete" }
                    }
                    @if let Some(input) = edit_input {
                        div.edit-form {
                            input.form-control."mb-2" type="number" id=(format!("edit-quantity-{}", id)) value=(input) min="1";
                            button.btn.btn-success."mr-2" data-action="save" data-id=(id) { "Save" }
                            button.btn.btn-secondary data-action="cancel" data-id=(id) { "Cancel" }
                        }
                    }
                }
            }
        }
    }
}

/// Result of a `refresh()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The list was rebuilt with this many reservations.
    Rendered(usize),
    /// A refresh dispatched later already rendered; this response was dropped.
    Superseded,
    /// Only reported after a mutation: the change was applied but the
    /// follow-up fetch failed, so the view still shows the old list.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied { message: String, refresh: Refresh },
    Declined,
}

struct ListState {
    cards: Vec<ReservationCard>,
    container: Container,
    loaded: bool,
    rendered_generation: u64,
    in_flight: HashSet<u32>,
}

impl ListState {
    fn card_mut(&mut self, id: u32) -> Result<&mut ReservationCard, ViewError> {
        self.cards
            .iter_mut()
            .find(|card| card.reservation.id == id)
            .ok_or(ViewError::UnknownReservation(id))
    }
}

/// Lists the user's reservations and lets each card be edited or deleted.
/// Every successful mutation ends with a full `refresh()`.
pub struct ReservationListView<A: ApiClient, N: Notifier> {
    api: Arc<A>,
    notifier: Arc<N>,
    metrics: Arc<ViewMetrics>,
    generation: AtomicU64,
    state: Mutex<ListState>,
}

impl<A: ApiClient, N: Notifier> ReservationListView<A, N> {
    pub fn new(api: Arc<A>, notifier: Arc<N>, metrics: Arc<ViewMetrics>, container: Container) -> Self {
        ReservationListView {
            api,
            notifier,
            metrics,
            generation: AtomicU64::new(0),
            state: Mutex::new(ListState {
                cards: Vec::new(),
                container,
                loaded: false,
                rendered_generation: 0,
                in_flight: HashSet::new(),
            }),
        }
    }

    pub async fn refresh(&self) -> Result<Refresh, ViewError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let reservations = match self.api.list_reservations().await {
            Ok(reservations) => {
                self.metrics.record_request(RESERVATIONS_ENDPOINT, Outcome::Success);
                reservations
            }
            Err(e) => {
                self.report_failure(RESERVATIONS_ENDPOINT, &e, LOAD_FAILED_MESSAGE);
                return Err(e.into());
            }
        };

        let mut state = self.state.lock().await;
        if generation < state.rendered_generation {
            event!(Level::DEBUG, "Dropping reservations from refresh {}, {} already rendered", generation, state.rendered_generation);
            return Ok(Refresh::Superseded);
        }

        state.rendered_generation = generation;
        state.loaded = true;
        state.cards = reservations.into_iter().map(ReservationCard::new).collect();
        Self::rebuild(&mut state);

        event!(Level::INFO, "Rendered {} reservations", state.cards.len());
        Ok(Refresh::Rendered(state.cards.len()))
    }

    pub async fn begin_edit(&self, id: u32) -> Result<(), ViewError> {
        let mut state = self.state.lock().await;
        let card = state.card_mut(id)?;
        card.state = CardState::Editing {
            input: card.reservation.quantity.to_string(),
        };
        Self::rebuild(&mut state);
        Ok(())
    }

    pub async fn set_edit_input(&self, id: u32, value: &str) -> Result<(), ViewError> {
        let mut state = self.state.lock().await;
        match &mut state.card_mut(id)?.state {
            CardState::Editing { input } => {
                *input = value.to_string();
            }
            CardState::Display => return Err(ViewError::NotEditing(id)),
        }
        Self::rebuild(&mut state);
        Ok(())
    }

    pub async fn cancel_edit(&self, id: u32) -> Result<(), ViewError> {
        let mut state = self.state.lock().await;
        let card = state.card_mut(id)?;
        if card.state == CardState::Display {
            return Err(ViewError::NotEditing(id));
        }
        card.state = CardState::Display;
        Self::rebuild(&mut state);
        Ok(())
    }

    /// Submits the edited quantity. The input must be a whole number above
    /// zero: "2.5" and "3abc" are rejected rather than truncated. Invalid
    /// input and failed requests leave the card in Editing.
    pub async fn save(&self, id: u32) -> Result<MutationOutcome, ViewError> {
        let quantity = {
            let mut state = self.state.lock().await;
            let input = match &state.card_mut(id)?.state {
                CardState::Editing { input } => input.clone(),
                CardState::Display => return Err(ViewError::NotEditing(id)),
            };

            let quantity = match parse_quantity(&input) {
                Some(quantity) => quantity,
                None => {
                    drop(state);
                    self.metrics.record_rejected_quantity();
                    self.notifier.alert(INVALID_QUANTITY_MESSAGE);
                    return Err(ViewError::InvalidQuantity(input));
                }
            };

            if !state.in_flight.insert(id) {
                return Err(ViewError::InFlight(id));
            }
            quantity
        };

        let result = self.api.update_reservation(id, quantity).await;
        self.state.lock().await.in_flight.remove(&id);

        match result {
            Ok(response) => {
                self.metrics.record_request(UPDATE_RESERVATION_ENDPOINT, Outcome::Success);
                event!(Level::INFO, "Reservation {} set to quantity {}", id, quantity);
                self.notifier.alert(&response.message);
                let refresh = self.refresh_after_mutation().await;
                Ok(MutationOutcome::Applied {
                    message: response.message,
                    refresh,
                })
            }
            Err(e) => {
                self.report_failure(UPDATE_RESERVATION_ENDPOINT, &e, UPDATE_FAILED_MESSAGE);
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, id: u32) -> Result<MutationOutcome, ViewError> {
        {
            let mut state = self.state.lock().await;
            state.card_mut(id)?;
            if state.in_flight.contains(&id) {
                return Err(ViewError::InFlight(id));
            }
        }

        if !self.notifier.confirm(DELETE_CONFIRMATION) {
            return Ok(MutationOutcome::Declined);
        }

        if !self.state.lock().await.in_flight.insert(id) {
            return Err(ViewError::InFlight(id));
        }
        let result = self.api.delete_reservation(id).await;
        self.state.lock().await.in_flight.remove(&id);

        match result {
            Ok(response) => {
                self.metrics.record_request(DELETE_RESERVATION_ENDPOINT, Outcome::Success);
                event!(Level::INFO, "Reservation {} deleted", id);
                self.notifier.alert(&response.message);
                let refresh = self.refresh_after_mutation().await;
                Ok(MutationOutcome::Applied {
                    message: response.message,
                    refresh,
                })
            }
            Err(e) => {
                self.report_failure(DELETE_RESERVATION_ENDPOINT, &e, DELETE_FAILED_MESSAGE);
                Err(e.into())
            }
        }
    }

    pub async fn card_state(&self, id: u32) -> Option<CardState> {
        let state = self.state.lock().await;
        state
            .cards
            .iter()
            .find(|card| card.reservation.id == id)
            .map(|card| card.state.clone())
    }

    /// Sum of the subtotals of every listed reservation.
    pub async fn total(&self) -> f64 {
        let state = self.state.lock().await;
        total_of(&state.cards)
    }

    /// The container, the empty-list message and the grand total.
    pub async fn render(&self) -> Markup {
        let state = self.state.lock().await;
        let empty = state.loaded && state.cards.is_empty();
        let message_visibility = if empty { Visibility::Shown } else { Visibility::Hidden };
        let total_visibility = if state.loaded && !empty { Visibility::Shown } else { Visibility::Hidden };

        html! {
            (state.container.render())
            p id=(NO_RESERVATIONS_MESSAGE_ID) style=[message_visibility.style()] { "You have no reservations." }
            p id=(TOTAL_PRICE_ID) style=[total_visibility.style()] {
                @if total_visibility == Visibility::Shown {
                    "Grand total: " (format_euros(total_of(&state.cards)))
                }
            }
        }
    }

    /// The refresh reports its own failure; the mutation itself stands.
    async fn refresh_after_mutation(&self) -> Refresh {
        match self.refresh().await {
            Ok(refresh) => refresh,
            Err(_) => Refresh::Failed,
        }
    }

    fn rebuild(state: &mut ListState) {
        let cards: Vec<Markup> = state.cards.iter().map(ReservationCard::render).collect();
        state.container.clear();
        for card in cards {
            state.container.append(card);
        }
    }

    fn report_failure(&self, endpoint: &str, error: &ApiError, message: &str) {
        self.metrics.record_request(endpoint, Outcome::Failure);
        event!(Level::ERROR, "Error occurred calling {}: {}", endpoint, error);
        self.notifier.alert(message);
    }
}

fn total_of(cards: &[ReservationCard]) -> f64 {
    cards.iter().map(|card| card.reservation.subtotal()).sum()
}

fn parse_quantity(input: &str) -> Option<u32> {
    match input.trim().parse::<u32>() {
        Ok(quantity) if quantity > 0 => Some(quantity),
        _ => None,
    }
}
