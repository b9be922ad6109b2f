use anyhow::Context;
use std::sync::Arc;
use telecall::application::{HangUpOutcome, ScreenPorts, VoiceCallScreen};
use telecall::config::Config;
use telecall::domain::meeting::MeetingEvent;
use telecall::domain::shared::value_objects::SessionContext;
use telecall::infrastructure::http::build_client;
use telecall::infrastructure::meeting::LoopbackConnector;
use telecall::infrastructure::navigation::HistoryNavigator;
use telecall::infrastructure::supabase::{
    PostgrestClient, RestAppointmentRepository, RestDoctorRepository,
};
use telecall::infrastructure::videosdk::VideoSdkClient;
use telecall::interface::metrics::init_metrics;
use telecall::interface::ScreenView;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

enum Step {
    Event(Option<MeetingEvent>),
    Interrupted,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting telecall");

    let config = Config::load()?;
    info!("Configuration loaded: {:?}", config);

    let prometheus = init_metrics().context("installing metrics recorder")?;

    let session = config
        .session
        .clone()
        .context("a [session] section with appointment_id and record_id is required")?;

    let http = build_client(&config.http)?;
    let provisioner = VideoSdkClient::new(
        http.clone(),
        &config.meeting.api_base,
        config.meeting.token.clone(),
    )?;
    let backend = PostgrestClient::new(http, &config.backend.url, config.backend.anon_key.clone())?;

    let ports = ScreenPorts {
        provisioner: Arc::new(provisioner),
        connector: Arc::new(LoopbackConnector::new()),
        appointments: Arc::new(RestAppointmentRepository::new(backend.clone())),
        doctors: Arc::new(RestDoctorRepository::new(backend)),
        navigator: Arc::new(HistoryNavigator::new()),
    };

    let context = SessionContext::new(session.appointment_id, session.record_id);
    let mut screen = VoiceCallScreen::new(context, ports, config.reconnect.policy());
    screen.mount().await;

    let room_id = match session.room_code.as_deref() {
        Some(code) => screen.join_room(code).await?,
        None => screen.create_room().await?,
    };
    info!("Room {} ready", room_id);

    screen.join_call().await?;
    debug!("Screen: {:?}", ScreenView::of(&screen));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let step = tokio::select! {
            event = screen.next_event() => Step::Event(event),
            _ = &mut shutdown => Step::Interrupted,
        };

        match step {
            Step::Event(Some(event)) => {
                screen.handle_meeting_event(event).await;
                debug!("Screen: {:?}", ScreenView::of(&screen));
            }
            Step::Event(None) => {
                warn!("Meeting event stream ended");
                break;
            }
            Step::Interrupted => {
                info!("Interrupted, hanging up");
                break;
            }
        }
    }

    match screen.hang_up().await? {
        HangUpOutcome::Completed(report) => info!("Hang-up finished: {:?}", report),
        HangUpOutcome::AlreadyEnded => info!("Session had already ended"),
    }

    debug!("Metrics:\n{}", prometheus.render());
    Ok(())
}
