use accrual_client::AccrualClient;
use database::PostgresStore;
use gophermart::{api, IdentityService, LedgerService, OrderService, ReconciliationWorker};
use shared::arguments::Arguments;
use shared::maintenance::CancellationToken;
use shared::token::TokenManager;
use std::sync::Arc;
use structopt::StructOpt;

#[tokio::main]
async fn main() {
    let args = Arguments::from_args();
    tracing_setup::initialize(&args.log_filter);
    tracing::info!(
        run_address = %args.run_address,
        accrual_system_address = %args.accrual_system_address,
        reconciliation_interval = ?args.reconciliation_interval,
        "starting gophermart"
    );

    let store = Arc::new(PostgresStore::new(&args.database_uri).expect("invalid database uri"));
    store.run_migrations().await.expect("failed to run database migrations");

    let tokens = TokenManager::new(args.jwt_signing_key.clone().into_bytes());
    let identity = Arc::new(IdentityService::new(
        store.clone(),
        tokens,
        args.password_salt.clone(),
        args.access_token_ttl,
        args.refresh_token_ttl,
    ));
    let orders = Arc::new(OrderService::new(store.clone()));
    let ledger = Arc::new(LedgerService::new(store.clone()));

    let accrual = Arc::new(AccrualClient::new(
        args.accrual_system_address.clone(),
        args.accrual_timeout,
    ));
    let worker = ReconciliationWorker::new(store, accrual, args.accrual_timeout);

    let cancellation = CancellationToken::new();

    let worker_task = tokio::task::spawn(shared::maintenance::run_forever(
        worker,
        args.reconciliation_interval,
        cancellation.clone(),
    ));

    let routes = api::routes(identity, orders, ledger);
    let (_, serve_future) =
        warp::serve(routes).bind_with_graceful_shutdown(args.run_address, {
            let cancellation = cancellation.clone();
            async move { cancellation.cancelled().await }
        });
    tracing::info!(address = %args.run_address, "serving gophermart");
    let serve_task = tokio::task::spawn(serve_future);

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, cancelling background work");
    cancellation.cancel();

    let grace_period = tokio::time::sleep(args.shutdown_grace_period);
    tokio::select! {
        _ = serve_task => tracing::info!("http server stopped"),
        _ = grace_period => tracing::warn!("shutdown grace period elapsed before server stopped"),
    }
    let _ = worker_task.await;
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
