//! Scripted TodoMVC session.
//!
//! Loads whatever the configured gateway holds, walks through the usual
//! gestures and prints each filter view. Set `TODO_STORAGE=file` to keep the
//! todos between runs.

use anyhow::Context;
use todomvc::config::Config;
use todomvc::{Filter, ListView, TodoApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let app = TodoApp::from_config(&config);

    let mut changes = app.subscribe();
    tokio::spawn(async move {
        while let Ok(action) = changes.recv().await {
            if !action.is_feedback() {
                tracing::debug!(?action, "Gesture");
            }
        }
    });

    let loaded = app.load().await.context("loading stored todos")?;
    tracing::info!(loaded, "Starting session");

    println!("=== TodoMVC ===\n");
    if loaded > 0 {
        print_view("Stored todos", &app.view().await);
    }

    let list = app.list();

    // Blank titles are ignored and leave the field untouched
    list.set_new_title("   ").await?;
    if list.create_todo().await?.is_none() {
        println!("Blank title ignored, field is {:?}", list.new_title().await);
    }

    let milk = list.create("Buy milk").await?;
    let docs = list.create("Write documentation").await?;
    let deploy = list.create("Deploy").await?;
    print_view("After creating", &app.view().await);

    if let Some(id) = milk {
        app.item(id).toggle().await?;
    }
    if let Some(id) = docs {
        let item = app.item(id);
        item.begin_edit().await?;
        item.commit_title("Write the README").await?;
    }
    if let Some(id) = deploy {
        // Emptying the title while editing deletes the item
        let item = app.item(id);
        item.begin_edit().await?;
        item.set_title("").await?;
    }
    print_view("After editing", &app.view().await);

    for filter in Filter::ALL {
        app.navigate(filter).await?;
        print_view(&format!("Filter: {filter}"), &app.view().await);
    }
    app.navigate(Filter::All).await?;

    list.clear_completed().await?;
    list.set_all_are_done(true).await?;
    print_view("After clear completed and toggle all", &app.view().await);

    app.settle().await.context("waiting for pending saves")?;
    if let Some(error) = app.last_error().await {
        tracing::warn!(%error, "Persistence reported a failure");
    }

    app.shutdown().await.context("shutting down")?;
    println!("Done.");
    Ok(())
}

fn print_view(heading: &str, view: &ListView) {
    println!("{heading}:");
    for item in &view.items {
        let status = if item.is_completed { "x" } else { " " };
        let editing = if item.is_editing { " (editing)" } else { "" };
        println!("  [{status}] {}{editing}", item.title);
    }
    println!("  {}\n", view.remaining_formatted);
}
