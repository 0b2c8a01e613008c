//! Searching an application's tool registry as the user types.
//!
//! Run with `RUST_LOG=toolsearch=debug` to watch requests being debounced,
//! dispatched and discarded.

use std::time::Duration;
use toolsearch::prelude::*;
use tracing_subscriber::EnvFilter;

/// A tool as the application knows it. Only the searchable fields are ever
/// shipped to the search worker.
#[derive(Debug, Clone)]
pub struct Tool {
  pub id: String,
  pub route: String,
  pub tags: Vec<String>,
  pub meta: LocaleMap,
}

impl Tool {
  fn new(id: &str, route: &str, tags: &[&str], names: &[(&str, &str, &str)]) -> Self {
    Self {
      id: id.to_string(),
      route: route.to_string(),
      tags: tags.iter().map(|tag| tag.to_string()).collect(),
      meta: names
        .iter()
        .map(|(locale, name, description)| (locale.to_string(), LocalizedMeta::new(*name, *description)))
        .collect(),
    }
  }
}

impl Searchable for Tool {
  fn id(&self) -> &str {
    &self.id
  }

  fn tags(&self) -> &[String] {
    &self.tags
  }

  fn localized_meta(&self) -> &LocaleMap {
    &self.meta
  }
}

fn registry() -> Vec<Tool> {
  vec![
    Tool::new(
      "base64",
      "/encoding/base64",
      &["encoding", "text"],
      &[
        ("en", "Base64 Encoder", "Encode and decode base64 text"),
        ("fr", "Encodeur Base64", "Encoder et décoder du texte en base64"),
      ],
    ),
    Tool::new(
      "hex-to-text",
      "/encoding/hex",
      &["encoding", "hex"],
      &[("en", "Hex to Text", "Decode hexadecimal into readable text")],
    ),
    Tool::new(
      "hash",
      "/crypto/hash",
      &["crypto", "digest"],
      &[
        ("en", "Hash Generator", "Compute MD5 and SHA digests"),
        ("de", "Hash-Generator", "Prüfsummen berechnen"),
      ],
    ),
    Tool::new(
      "uuid",
      "/random/uuid",
      &["random", "identifier"],
      &[("en", "UUID Generator", "Generate random v4 identifiers")],
    ),
  ]
}

fn print(label: &str, state: &SearchState<Tool>) {
  let routes: Vec<&str> = state
    .results
    .iter()
    .flat_map(|items| items.iter().map(|tool| tool.route.as_str()))
    .collect();
  println!("{label:<24} {routes:?}");
}

async fn settle(session: &SearchSession<Tool>) -> SearchState<Tool> {
  let mut updates = session.subscribe();
  let state = match updates.wait_for(|state| !state.searching).await {
    Ok(state) => state.clone(),
    Err(_) => session.state(),
  };
  state
}

#[tokio::main]
async fn main() -> toolsearch::error::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = SearchConfig::from_env()?;
  println!("debounce: {:?}", config.debounce());

  // Start without a catalog, as if it were still being fetched.
  let session = SearchSession::spawn(config, CatalogSource::empty());
  println!("backend: {:?}", session.backend_kind());

  session.set_query("text");
  tokio::time::sleep(Duration::from_millis(10)).await;
  print("catalog not loaded:", &session.state());

  session.set_catalog(Some(registry()));
  tokio::time::sleep(Duration::from_millis(10)).await;
  print("catalog loaded:", &settle(&session).await);

  // Typing quickly: only the last query is dispatched.
  for partial in ["h", "ha", "has", "hash"] {
    session.set_query(partial);
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  let state = settle(&session).await;
  print("typed \"hash\":", &state);
  println!("stats: {:?}", state.stats);

  session.set_query("encodeur");
  session.set_locale(Some("fr".to_string()));
  tokio::time::sleep(Duration::from_millis(10)).await;
  print("\"encodeur\" in fr:", &settle(&session).await);

  session.set_query("");
  tokio::time::sleep(Duration::from_millis(10)).await;
  print("browse:", &settle(&session).await);

  session.dispose().await;
  Ok(())
}
