use anyhow::Result;
use axum::extract::{Form, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{
    routing::{get, post},
    Router,
};
use local_ip_address::local_ip;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info};

use folio::{
    config::Config,
    controller::{SearchController, SearchSettings},
    openlibrary::OpenLibrary,
    traits::Catalog,
    types::uuid::Uuid,
    view::{self, ViewOptions},
};

pub struct TheStateOfAffairs<C: Catalog> {
    controller: SearchController<C>,
    view:       ViewOptions,
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    q: String,
}

pub async fn start(config: &Config) -> Result<()> {
    let state = Arc::new(TheStateOfAffairs {
        controller: SearchController::new(
            OpenLibrary::from_config(config)?,
            SearchSettings::from_config(config),
        ),
        view:       ViewOptions::from_config(config),
    });

    let ip = if config.bind_local_ip {
        local_ip()?
    } else {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    };
    let port = config.port;
    let addr = SocketAddr::from((ip, port));
    info!("Listening on {ip}:{port}.");
    axum::Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await?;
    Ok(())
}

fn app<C: Catalog>(state: Arc<TheStateOfAffairs<C>>) -> Router {
    Router::new()
        .route("/", get(index::<C>))
        .route("/search", post(search::<C>))
        .route("/covers/:id", get(cover::<C>))
        .route("/healthz", get(|| async { "ok\n" }))
        .with_state(state)
}

async fn index<C: Catalog>(State(state): State<Arc<TheStateOfAffairs<C>>>) -> Html<String> {
    let render = state.controller.state().read().await;
    Html(view::render_page(&render, &state.view))
}

async fn search<C: Catalog>(
    State(state): State<Arc<TheStateOfAffairs<C>>>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    info!("Received search for {:?}.", form.q);
    // The page polls while loading, nobody waits on the search itself.
    let _ = state.controller.search(&form.q).await;
    Redirect::to("/")
}

async fn cover<C: Catalog>(
    Path(id): Path<String>,
    State(state): State<Arc<TheStateOfAffairs<C>>>,
) -> Result<Response, StatusCode> {
    let id = match id.parse::<Uuid>() {
        Ok(id) => id,
        Err(_) => {
            debug!("{} is not a cover id.", id);
            return Err(StatusCode::NOT_FOUND);
        }
    };
    match state.controller.covers().get(&id) {
        Some(image) => {
            Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
        }
        None => {
            debug!("Cover {} is gone.", id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
