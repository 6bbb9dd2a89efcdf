//! Background worker applying delivery events reported by the emailer and
//! dispatching scheduled campaigns once they are due.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;

use realty_mailer::db::establish_connection_pool;
use realty_mailer::models::config::ServerConfig;
use realty_mailer::models::zmq::DeliveryEvent;
use realty_mailer::repository::DieselRepository;
use realty_mailer::services::delivery::{dispatch_due_campaigns, process_delivery_event};
use realty_mailer::services::dispatch::EmailDispatcher;
use realty_mailer::services::unsubscribe::UnsubscribeTokens;
use realty_mailer::zmq::ZmqSender;

fn handle_message(repo: &DieselRepository, payload: &[u8]) {
    match serde_json::from_slice::<DeliveryEvent>(payload) {
        Ok(event) => {
            if let Err(e) = process_delivery_event(repo, &event) {
                log::error!(
                    "Error processing {:?} event for campaign {}: {e}",
                    event.event,
                    event.campaign_id
                );
            }
        }
        Err(e) => log::error!("Error decoding delivery event: {e}"),
    }
}

fn run_scheduler(
    repo: DieselRepository,
    dispatcher: impl EmailDispatcher,
    tokens: UnsubscribeTokens,
    interval: Duration,
) {
    loop {
        match dispatch_due_campaigns(&repo, &dispatcher, &tokens, Utc::now().naive_utc()) {
            Ok(0) => {}
            Ok(sent) => log::info!("Dispatched {sent} scheduled campaign(s)"),
            Err(e) => log::error!("Error dispatching scheduled campaigns: {e}"),
        }
        thread::sleep(interval);
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let dispatcher = match ZmqSender::start(&server_config.zmq_emailer_pub) {
        Ok(sender) => sender,
        Err(e) => {
            log::error!("Failed to start ZMQ sender: {e}");
            std::process::exit(1);
        }
    };

    let context = zmq::Context::new();
    let events = match context.socket(zmq::SUB).and_then(|socket| {
        socket.connect(&server_config.zmq_events_sub)?;
        socket.set_subscribe(b"")?;
        Ok(socket)
    }) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot subscribe to {}: {e}", server_config.zmq_events_sub);
            std::process::exit(1);
        }
    };

    log::info!("Starting event worker");

    let tokens = UnsubscribeTokens::from_config(&server_config);
    let interval = Duration::from_secs(server_config.dispatch_interval_secs.max(1));
    let scheduler_repo = repo.clone();
    let scheduler = thread::Builder::new()
        .name("scheduled-dispatch".to_string())
        .spawn(move || run_scheduler(scheduler_repo, dispatcher, tokens, interval));
    if let Err(e) = scheduler {
        log::error!("Failed to start scheduler thread: {e}");
        std::process::exit(1);
    }

    loop {
        match events.recv_bytes(0) {
            Ok(payload) => handle_message(&repo, &payload),
            Err(e) => log::error!("Error receiving delivery event: {e}"),
        }
    }
}
