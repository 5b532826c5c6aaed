// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod api;
mod auth;
mod config;
mod location;
mod view;

use std::error::Error;

use boarding_estimator::{
    Estimator, FlightSchedule, GeoPoint, GeolocationResolver, PositionOptions, PLACEHOLDER,
};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use api::{ApiClient, FlightQuery, ProfileUpdate, RegisterRequest, UserProfile};
use auth::{AuthSession, FileStore};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "flight-planner", version, about = "Flight tracking and airport trip planning")]
struct Cli {
    /// Flight API base URL (overrides config and environment)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// When to leave for the airport and how long until boarding closes
    Plan {
        flight_id: i64,
        /// Keep refreshing against the clock until Ctrl-C
        #[arg(long)]
        watch: bool,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Flight schedule, delay and boarding state, by id or flight number
    Flight { flight: String },
    /// Search flights
    Search {
        /// Departure airport IATA code
        #[arg(long)]
        from: Option<String>,
        /// Arrival airport IATA code
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show your profile, or update the fields given
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Flights you are subscribed to
    Subscriptions,
    Subscribe { flight_id: i64 },
    Unsubscribe { flight_number: String },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args, Debug)]
struct LocationArgs {
    /// Current latitude (skips geolocation)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Current longitude (skips geolocation)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl LocationArgs {
    fn point(&self) -> Option<GeoPoint> {
        self.lat.zip(self.lon).map(GeoPoint::from)
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Store a fixed position for devices without location services
    SetLocation {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },
    /// Remove the stored position
    ClearLocation,
}

fn print_flight_row(flight: &FlightSchedule) {
    println!(
        "{:>6}  {:<8} {:<12} {}",
        flight.id,
        flight.flight_number.as_deref().unwrap_or(PLACEHOLDER),
        flight.status,
        flight.title()
    );
}

fn print_profile(user: &UserProfile) {
    let field = |value: Option<&str>| value.unwrap_or(PLACEHOLDER).to_string();
    println!("First name:    {}", field(user.first_name.as_deref()));
    println!("Last name:     {}", field(user.last_name.as_deref()));
    println!("E-mail:        {}", field(user.email.as_deref()));
    println!("Phone:         {}", field(user.phone_number.as_deref()));
    println!("Subscriptions: {}", user.subscription_count.unwrap_or(0));
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url.clone_from(url);
    }

    let mut session = AuthSession::restore(FileStore::open_or_reset(FileStore::default_path())?);
    let base_url = if cli.api_url.is_some() {
        config.api_base_url.clone()
    } else {
        config.resolve_api_base_url()
    };
    let api = ApiClient::new(&base_url, config.request_timeout())?
        .with_token(session.token().map(str::to_string));
    debug!("Flight API at {}", api.base_url());

    match cli.command {
        Command::Plan {
            flight_id,
            watch,
            location,
        } => run_plan(&config, &api, flight_id, watch, location.point()).await?,
        Command::Flight { flight } => {
            let flight = match flight.trim().parse::<i64>() {
                Ok(id) => api.flight(id).await?,
                Err(_) => api.flight_by_number(&flight).await?,
            };
            println!("{}", view::render_details(&flight, local_now()));
        }
        Command::Search { from, to, status } => {
            let query = FlightQuery {
                departure_airport: from,
                arrival_airport: to,
                status,
            };
            let flights = api.search_flights(&query).await?;
            if flights.is_empty() {
                println!("No flights match these filters");
            }
            for flight in &flights {
                print_flight_row(flight);
            }
        }
        Command::Login { email, password } => {
            session.login(&api, &email, &password).await?;
            println!("Signed in as {email}");
        }
        Command::Register {
            first_name,
            last_name,
            phone,
            email,
            password,
        } => {
            let request = RegisterRequest {
                first_name,
                last_name,
                phone,
                email,
                password,
            };
            let response = session.register(&api, &request).await?;
            if let Some(message) = response.message {
                println!("{message}");
            }
            if session.is_authenticated() {
                println!("Signed in as {}", request.email);
            }
        }
        Command::Logout => {
            session.logout()?;
            println!("Signed out, session cleared in {}", session.store().path().display());
        }
        Command::Profile {
            first_name,
            last_name,
            phone,
            password,
        } => {
            let mut user = api.user(session.email()?).await?;
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone_number: phone,
                password,
            };
            if let Some(update) = update.normalized() {
                user = api.update_user(user.id, &update).await?;
                println!("Profile updated\n");
            }
            print_profile(&user);
        }
        Command::Subscriptions => {
            let email = session.email()?;
            let subscriptions = api.subscriptions(email).await?;
            if subscriptions.is_empty() {
                println!("No subscriptions yet");
            }
            for subscription in subscriptions {
                match api.flight(subscription.flight.id).await {
                    Ok(flight) => print_flight_row(&flight),
                    Err(e) => warn!(
                        "Could not load flight {} ({}): {}",
                        subscription.flight.id,
                        subscription.flight.flight_number.as_deref().unwrap_or(PLACEHOLDER),
                        e
                    ),
                }
            }
        }
        Command::Subscribe { flight_id } => {
            session.email()?;
            api.subscribe(flight_id).await?;
            println!("Subscribed to flight {flight_id}");
        }
        Command::Unsubscribe { flight_number } => {
            session.email()?;
            api.unsubscribe(&flight_number).await?;
            println!("Unsubscribed from {flight_number}");
        }
        Command::Config { action } => run_config(config, action)?,
    }

    Ok(())
}

async fn run_plan(
    config: &AppConfig,
    api: &ApiClient,
    flight_id: i64,
    watch: bool,
    cli_position: Option<GeoPoint>,
) -> Result<(), Box<dyn Error>> {
    let resolver = GeolocationResolver::new(
        location::position_source(config, cli_position),
        PositionOptions::default(),
    );
    let estimator = Estimator::new(config.processing.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    println!("Loading…");
    let Some(loaded) = view::load_plan(api, &resolver, flight_id, &cancel).await else {
        return Ok(());
    };
    let state = match loaded {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load flight {}: {}", flight_id, e);
            return Err(format!("Could not load flight data: {e}").into());
        }
    };

    let airport_override = state
        .flight
        .departure_iata()
        .and_then(|code| config.airport_position(code));

    if watch {
        info!("Refreshing every {:?}, Ctrl-C to stop", config.refresh_interval());
        let context = view::PlanContext {
            estimator: &estimator,
            resolver: &resolver,
            airport_override,
        };
        view::watch_plan(
            state,
            context,
            config.refresh_interval(),
            &cancel,
            local_now,
            |frame| println!("\n{frame}"),
        )
        .await;
    } else {
        let now = local_now();
        let estimate = estimator.evaluate(&state.flight, Some(&state.position), airport_override, now);
        println!("{}", view::render_plan(&state.flight, &estimate, now));
    }
    Ok(())
}

fn run_config(mut config: AppConfig, action: Option<ConfigAction>) -> Result<(), Box<dyn Error>> {
    match action {
        None => {
            println!("Config file: {}", AppConfig::get_config_path()?.display());
            println!("API URL:     {}", config.resolve_api_base_url());
            match config.position_override() {
                Some(point) => println!("Position:    {point}"),
                None if config.use_ip_geolocation => println!("Position:    IP geolocation"),
                None => println!("Position:    unavailable (fallback city centre)"),
            }
            println!(
                "Procedures:  {} min, average speed {} km/h, traffic x{}",
                config.processing.total_processing_minutes(),
                config.processing.average_speed_kmh,
                config.processing.traffic_multiplier
            );
        }
        Some(ConfigAction::SetLocation { lat, lon }) => {
            config.override_latitude = Some(lat);
            config.override_longitude = Some(lon);
            config.save()?;
            println!("Position set to {}", GeoPoint::new(lat, lon));
        }
        Some(ConfigAction::ClearLocation) => {
            config.override_latitude = None;
            config.override_longitude = None;
            config.save()?;
            println!("Position override removed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "flight-planner",
            "plan",
            "7",
            "--lat",
            "40.6413",
            "--lon",
            "-73.7781",
        ])
        .unwrap();
        match cli.command {
            Command::Plan { flight_id, location, watch } => {
                assert_eq!(flight_id, 7);
                assert!(!watch);
                assert_eq!(location.point(), Some(GeoPoint::new(40.6413, -73.7781)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_profile_without_flags_only_shows() {
        let cli = Cli::try_parse_from(["flight-planner", "profile"]).unwrap();
        let Command::Profile {
            first_name,
            last_name,
            phone,
            password,
        } = cli.command
        else {
            panic!("expected profile command");
        };
        let update = ProfileUpdate {
            first_name,
            last_name,
            phone_number: phone,
            password,
        };
        assert!(update.normalized().is_none());
    }

    #[test]
    fn test_profile_phone_update() {
        let cli =
            Cli::try_parse_from(["flight-planner", "profile", "--phone", "+7 900 000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Profile { phone: Some(ref p), first_name: None, .. } if p == "+7 900 000"
        ));
    }

    #[test]
    fn test_latitude_requires_longitude() {
        assert!(Cli::try_parse_from(["flight-planner", "plan", "7", "--lat", "1.0"]).is_err());
    }
}
