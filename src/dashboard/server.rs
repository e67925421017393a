//! HTTP surface: the page with the three dropdowns and the plot endpoint behind it.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;
use tokio::net::TcpListener;

use super::{render, Dashboard, DashboardError, Selection, DEFAULT_X, DEFAULT_Y, STAT_OPTIONS};

/// Query string of `/plot.svg`. Missing stats fall back to the defaults; an empty player means none.
#[derive(Debug, Default, Deserialize)]
pub struct PlotQuery {
    pub player: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl From<PlotQuery> for Selection {
    fn from(query: PlotQuery) -> Self {
        Selection {
            player: query.player.filter(|p| !p.is_empty()),
            x: query.x.unwrap_or_else(|| DEFAULT_X.to_string()),
            y: query.y.unwrap_or_else(|| DEFAULT_Y.to_string()),
        }
    }
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plot.svg", get(plot))
        .with_state(dashboard)
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serves until the process is stopped.
pub async fn serve(dashboard: Arc<Dashboard>, listener: TcpListener) -> Result<()> {
    axum::serve(listener, router(dashboard)).await?;
    Ok(())
}

async fn index(State(dashboard): State<Arc<Dashboard>>) -> Html<String> {
    Html(index_page(&dashboard))
}

async fn plot(State(dashboard): State<Arc<Dashboard>>, Query(query): Query<PlotQuery>) -> Response {
    let selection = Selection::from(query);
    let scatter = match dashboard.scatter(&selection) {
        Ok(scatter) => scatter,
        Err(DashboardError::UnknownStat(stat)) => {
            return (StatusCode::BAD_REQUEST, format!("unknown stat `{}`", stat)).into_response();
        }
        Err(err) => {
            error!("plot {:?} failed: {}", selection, err);
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };
    match render::render_svg(scatter.as_ref()) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(err) => {
            error!("rendering {:?} failed: {:#}", selection, err);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render plot").into_response()
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn options<'a>(values: impl IntoIterator<Item = &'a str>, selected: Option<&str>) -> String {
    values
        .into_iter()
        .map(|v| {
            let v = escape_html(v);
            let mark = if selected.map(escape_html).as_deref() == Some(v.as_str()) { " selected" } else { "" };
            format!("<option value=\"{v}\"{mark}>{v}</option>")
        })
        .collect::<Vec<String>>()
        .join("")
}

pub fn index_page(dashboard: &Dashboard) -> String {
    let initial = dashboard.default_selection();
    let mut player_options = String::from("<option value=\"\">(none)</option>");
    player_options.push_str(&options(
        dashboard.players().iter().map(String::as_str),
        initial.player.as_deref(),
    ));
    let x_options = options(STAT_OPTIONS, Some(initial.x.as_str()));
    let y_options = options(STAT_OPTIONS, Some(initial.y.as_str()));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>NBA Player Game Log Dashboard</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
label {{ display: block; margin-top: 1em; }}
select {{ min-width: 16em; }}
</style>
</head>
<body>
<h1>NBA Player Game Log Dashboard</h1>
<label for="player-dropdown">Select Player:</label>
<select id="player-dropdown">{player_options}</select>
<label for="x-axis-dropdown">Select X-axis Stat:</label>
<select id="x-axis-dropdown">{x_options}</select>
<label for="y-axis-dropdown">Select Y-axis Stat:</label>
<select id="y-axis-dropdown">{y_options}</select>
<div><img id="scatter-plot" alt="scatter plot"></div>
<script>
const ids = ["player-dropdown", "x-axis-dropdown", "y-axis-dropdown"];
function refresh() {{
  const [player, x, y] = ids.map(id => document.getElementById(id).value);
  const query = new URLSearchParams({{ player, x, y }});
  document.getElementById("scatter-plot").src = "/plot.svg?" + query.toString();
}}
ids.forEach(id => document.getElementById(id).addEventListener("change", refresh));
refresh();
</script>
</body>
</html>
"#
    )
}
