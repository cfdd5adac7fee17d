//! Client-side view state: the current route, the loaded catalogue and the
//! diagram transform of one browsing session.
//!
//! Every navigation takes a new generation number. A load that completes after
//! a newer navigation started is reported as [`Outcome::Superseded`] and leaves
//! the session untouched.

use parking_lot::Mutex;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

use crate::logic::diagram::ViewTransform;
use crate::logic::viewer::{ViewError, Viewer};
use crate::model::{Catalogue, DiffView, ModelView};
use crate::store::ModelSource;

/// Address-bar state of the viewer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewRoute {
    #[default]
    Home,
    Browse {
        model: String,
        version: Option<String>,
    },
    Diff {
        model: String,
        from: Option<String>,
        to: Option<String>,
    },
}

/// Origin that address-bar paths are resolved against
const ROUTE_BASE: &str = "http://viewer.local/";

fn decode_segment(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

impl ViewRoute {
    /// Parse `/models/<model>[/versions/<version>]`, `/diff?model=..&from=..&to=..` or `/`.
    /// Absolute URLs are accepted too; the fragment is ignored.
    pub fn parse(url: &str) -> Option<ViewRoute> {
        let url = Url::parse(ROUTE_BASE).ok()?.join(url).ok()?;
        let segments = url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect::<Option<Vec<String>>>()?;
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match segments.as_slice() {
            [] | ["index.html"] => Some(ViewRoute::Home),
            ["models", model] => Some(ViewRoute::Browse {
                model: model.to_string(),
                version: None,
            }),
            ["models", model, "versions", version] => Some(ViewRoute::Browse {
                model: model.to_string(),
                version: Some(version.to_string()),
            }),
            ["diff"] | ["diff.html"] => {
                let mut model = None;
                let mut from = None;
                let mut to = None;
                for (key, value) in url.query_pairs() {
                    let value = Some(value.into_owned()).filter(|v| !v.is_empty());
                    match key.as_ref() {
                        "model" => model = value,
                        "from" => from = value,
                        "to" => to = value,
                        _ => {}
                    }
                }
                Some(ViewRoute::Diff {
                    model: model?,
                    from,
                    to,
                })
            }
            _ => None,
        }
    }

    pub fn to_url(&self) -> String {
        match self {
            ViewRoute::Home => "/".to_string(),
            ViewRoute::Browse { model, version } => {
                let mut url = format!("/models/{}", urlencoding::encode(model));
                if let Some(version) = version {
                    let _ = write!(url, "/versions/{}", urlencoding::encode(version));
                }
                url
            }
            ViewRoute::Diff { model, from, to } => {
                let mut url = format!("/diff?model={}", urlencoding::encode(model));
                if let Some(from) = from {
                    let _ = write!(url, "&from={}", urlencoding::encode(from));
                }
                if let Some(to) = to {
                    let _ = write!(url, "&to={}", urlencoding::encode(to));
                }
                url
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Home(Arc<Catalogue>),
    Model(Box<ModelView>),
    Diff(Box<DiffView>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Current(T),
    /// A newer navigation started while this one was loading
    Superseded,
}

impl<T> Outcome<T> {
    pub fn current(self) -> Option<T> {
        match self {
            Outcome::Current(value) => Some(value),
            Outcome::Superseded => None,
        }
    }
}

pub struct ViewerSession<S: ModelSource> {
    viewer: Arc<Viewer<S>>,
    generation: AtomicU64,
    catalogue: Mutex<Option<Arc<Catalogue>>>,
    route: Mutex<ViewRoute>,
    diagram: Mutex<ViewTransform>,
}

impl<S: ModelSource> ViewerSession<S> {
    pub fn new(viewer: Arc<Viewer<S>>) -> Self {
        Self {
            viewer,
            generation: AtomicU64::new(0),
            catalogue: Mutex::new(None),
            route: Mutex::new(ViewRoute::Home),
            diagram: Mutex::new(ViewTransform::default()),
        }
    }

    pub fn route(&self) -> ViewRoute {
        self.route.lock().clone()
    }

    pub fn catalogue(&self) -> Option<Arc<Catalogue>> {
        self.catalogue.lock().clone()
    }

    /// Start a navigation and return its generation
    pub fn begin_navigation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Re-fetch the catalogue; on failure browsing stays disabled until the next attempt
    pub async fn refresh_catalogue(&self) -> Result<Arc<Catalogue>, ViewError> {
        let catalogue = Arc::new(self.viewer.catalogue().await?);
        *self.catalogue.lock() = Some(catalogue.clone());
        Ok(catalogue)
    }

    async fn ensure_catalogue(&self) -> Result<Arc<Catalogue>, ViewError> {
        match self.catalogue() {
            Some(catalogue) => Ok(catalogue),
            None => self.refresh_catalogue().await,
        }
    }

    /// Navigate to `route`, loading everything its page needs
    pub async fn open(&self, route: ViewRoute) -> Result<Outcome<Page>, ViewError> {
        let generation = self.begin_navigation();
        let catalogue = self.ensure_catalogue().await?;

        let (page, canonical) = match &route {
            ViewRoute::Home => (Page::Home(catalogue.clone()), ViewRoute::Home),
            ViewRoute::Browse { model, version } => {
                let view = self
                    .viewer
                    .model_view(&catalogue, model, version.as_deref())
                    .await?;
                let canonical = ViewRoute::Browse {
                    model: view.model.clone(),
                    version: Some(view.version.clone()),
                };
                (Page::Model(Box::new(view)), canonical)
            }
            ViewRoute::Diff { model, from, to } => {
                let view = self
                    .viewer
                    .diff_view(&catalogue, model, from.as_deref(), to.as_deref())
                    .await?;
                let canonical = ViewRoute::Diff {
                    model: view.model.clone(),
                    from: Some(view.from.clone()),
                    to: Some(view.to.clone()),
                };
                (Page::Diff(Box::new(view)), canonical)
            }
        };

        if !self.is_current(generation) {
            log::debug!("discarding stale load for {}", route.to_url());
            return Ok(Outcome::Superseded);
        }

        *self.route.lock() = canonical;
        self.diagram.lock().reset();
        Ok(Outcome::Current(page))
    }

    /// Same as [`open`](Self::open) but starting from an address-bar URL
    pub async fn open_url(&self, url: &str) -> Result<Outcome<Page>, ViewError> {
        self.open(ViewRoute::parse(url).unwrap_or_default()).await
    }

    pub fn diagram_transform(&self) -> ViewTransform {
        self.diagram.lock().clone()
    }

    pub fn zoom_diagram(&self, delta_y: f64) -> f64 {
        self.diagram.lock().wheel(delta_y)
    }

    pub fn begin_pan(&self, x: f64, y: f64) {
        self.diagram.lock().begin_drag(x, y);
    }

    pub fn pan_to(&self, x: f64, y: f64) {
        self.diagram.lock().drag_to(x, y);
    }

    pub fn end_pan(&self) {
        self.diagram.lock().end_drag();
    }
}
