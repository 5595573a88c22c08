use firestore_watch::DocumentWatchSnapshot;
use firestore_watch::Result;
use firestore_watch::WatchClient;
use firestore_watch::WatchSettings;
use firestore_watch::WatchStopHandle;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    init_observability();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: firestore-watch <document-path>");
        std::process::exit(2);
    };

    let settings = WatchSettings::new()?.validate()?;
    let client = WatchClient::connect(&settings)?;
    let mut snapshots = client.document_snapshots(&path, CancellationToken::new())?;

    // Listen on Shutdown Signal
    let stop = snapshots.stop_handle();
    tokio::spawn(async move {
        if let Err(e) = graceful_shutdown(stop).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    info!(database = %client.database(), document = %path, "watching, press CTRL+C to stop");
    while let Some(snapshot) = snapshots.next().await? {
        print_snapshot(&snapshot);
    }

    println!("Exiting program.");
    Ok(())
}

fn print_snapshot(snapshot: &DocumentWatchSnapshot) {
    match &snapshot.document {
        Some(doc) => {
            let mut keys: Vec<&String> = doc.fields.keys().collect();
            keys.sort();
            println!("[{:?}] {} updated at {:?}", snapshot.read_time, doc.path, doc.update_time);
            for key in keys {
                println!("  {} = {:?}", key, doc.fields[key].value_type);
            }
        }
        None => println!("[{:?}] {} does not exist", snapshot.read_time, snapshot.name),
    }
}

async fn graceful_shutdown(stop: WatchStopHandle) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    stop.stop();
    info!("Watch stopped");
    Ok(())
}

fn init_observability() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base_subscriber = tracing_subscriber::fmt::layer().with_filter(filter);
    tracing_subscriber::registry().with(base_subscriber).init();
}
