use maud::Markup;

use crate::{
    api::ApiClient,
    errors::{CliError, ViewError},
    notifier::Notifier,
    state::AppState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Catalog,
    Reservations,
    /// The quantity stays raw text so it goes through the same checks as
    /// the edit form input.
    Edit { id: u32, quantity: String },
    Delete { id: u32, assume_yes: bool },
}

impl Command {
    pub fn parse<I>(args: I) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["catalog"] => Ok(Command::Catalog),
            ["reservations"] => Ok(Command::Reservations),
            ["edit", id, quantity] => Ok(Command::Edit {
                id: parse_id(id)?,
                quantity: quantity.to_string(),
            }),
            ["delete", id] => Ok(Command::Delete {
                id: parse_id(id)?,
                assume_yes: false,
            }),
            ["delete", id, "--yes"] | ["delete", "--yes", id] => Ok(Command::Delete {
                id: parse_id(id)?,
                assume_yes: true,
            }),
            _ => Err(CliError::Usage),
        }
    }

    pub fn assume_yes(&self) -> bool {
        matches!(self, Command::Delete { assume_yes: true, .. })
    }
}

fn parse_id(raw: &str) -> Result<u32, CliError> {
    raw.parse::<u32>().map_err(|_| CliError::InvalidId(raw.to_string()))
}

/// Runs one command against the backend and returns the fragment to print.
pub async fn run<A: ApiClient, N: Notifier>(command: &Command, state: &AppState<A, N>) -> Result<Markup, ViewError> {
    match command {
        Command::Catalog => {
            let mut view = state.catalog_view();
            view.load().await?;
            Ok(view.render())
        }
        Command::Reservations => {
            let view = state.reservation_view();
            view.refresh().await?;
            Ok(view.render().await)
        }
        Command::Edit { id, quantity } => {
            let view = state.reservation_view();
            view.refresh().await?;
            view.begin_edit(*id).await?;
            view.set_edit_input(*id, quantity).await?;
            view.save(*id).await?;
            Ok(view.render().await)
        }
        Command::Delete { id, .. } => {
            let view = state.reservation_view();
            view.refresh().await?;
            view.delete(*id).await?;
            Ok(view.render().await)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::{
        api::MockApiClient,
        domain::{Product, Reservation, ReservedLot},
        metrics::ViewMetrics,
        notifier::MockNotifier,
    };

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn reservation(id: u32, quantity: u32) -> Reservation {
        Reservation {
            id,
            quantity,
            lot: ReservedLot {
                id: 1,
                product: Product {
                    id: 1,
                    name: String::from("Pane"),
                    image: None,
                    producer: None,
                },
                delivery_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                unit_of_measure: String::from("pz"),
                unit_price: 1.5,
            },
        }
    }

    fn state(api: MockApiClient, notifier: MockNotifier) -> AppState<MockApiClient, MockNotifier> {
        AppState {
            api: Arc::new(api),
            notifier: Arc::new(notifier),
            metrics: Arc::new(ViewMetrics::new().unwrap()),
            static_images_path: String::from("/static/imgs"),
        }
    }

    #[test]
    fn parses_every_subcommand() {
        assert_eq!(Command::parse(args("catalog")), Ok(Command::Catalog));
        assert_eq!(Command::parse(args("reservations")), Ok(Command::Reservations));
        assert_eq!(
            Command::parse(args("edit 5 abc")),
            Ok(Command::Edit { id: 5, quantity: String::from("abc") })
        );
        assert_eq!(
            Command::parse(args("delete 5")),
            Ok(Command::Delete { id: 5, assume_yes: false })
        );
        assert!(Command::parse(args("delete --yes 5")).unwrap().assume_yes());
    }

    #[test]
    fn rejects_malformed_invocations() {
        assert_eq!(Command::parse(args("")), Err(CliError::Usage));
        assert_eq!(Command::parse(args("edit 5")), Err(CliError::Usage));
        assert_eq!(Command::parse(args("delete five")), Err(CliError::InvalidId(String::from("five"))));
    }

    #[tokio::test]
    async fn edit_with_zero_stops_before_the_backend() {
        let mut api = MockApiClient::new();
        api.expect_list_reservations().times(1).returning(|| Ok(vec![reservation(5, 3)]));
        api.expect_update_reservation().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_alert().times(1).return_const(());
        let state = state(api, notifier);

        let result = run(&Command::Edit { id: 5, quantity: String::from("0") }, &state).await;

        assert!(matches!(result, Err(ViewError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn reservations_command_renders_the_list() {
        let mut api = MockApiClient::new();
        api.expect_list_reservations().returning(|| Ok(vec![reservation(5, 2)]));
        let state = state(api, MockNotifier::new());

        let html = run(&Command::Reservations, &state).await.unwrap().into_string();

        assert!(html.contains("Grand total: 3.00 €"));
    }
}
