use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use windowid::{IdError, IdPool, IdPoolDesc, WindowId};

/// Stock IDs the toolkit defines as literals, kept out of automatic allocation.
const STOCK_IDS: [WindowId; 3] = [5100, 5101, 5102];

fn run() -> Result<(), IdError> {
    let pool = IdPool::new(IdPoolDesc {
        range: 5098..=5106,
        preregistered: STOCK_IDS.to_vec(),
    })?;

    let buttons = pool.new_id_ref(3)?.into_vec();
    info!("Reserved buttons: {:?}", buttons);

    let menu = pool.new_id_refs(1)?.remove(0);
    let menu_binding = menu.clone();
    info!("{} held by {} handle(s)", menu, pool.ref_count(menu.value()));

    let legacy = pool.new_legacy_id()?;
    info!("Legacy id {}", legacy);

    if let Err(err) = pool.register_external_id(buttons[0].value()) {
        error!("{}", err);
    }

    drop(menu);
    info!("{} still reserved: {}", menu_binding, !pool.is_free(menu_binding.value()));

    let freed = menu_binding.value();
    drop(menu_binding);
    info!("Id {} free again: {}", freed, pool.is_free(freed));

    drop(buttons);
    info!("{} id(s) reserved after dropping every handle", pool.reserved_len());

    Ok(())
}

fn main() {
    let console_log = tracing_subscriber::fmt::Layer::new()
        .with_ansi(true)
        .with_writer(std::io::stdout);
    let subscriber = tracing_subscriber::registry().with(console_log);
    let _ = tracing::subscriber::set_global_default(subscriber);

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}
