//! Serves the built single page application for every path no route claims.

use std::{
    fs,
    path::{Path, PathBuf},
};

use http::StatusCode;

use crate::{
    http::{Request, Response},
    routing::Params,
    store::{SeoStoreService, SettingStoreService, ENABLE_DYNAMIC_SEO},
    HttpError, Result,
};

pub const NOT_BUILT: &str = "Frontend not built yet. Run 'npm run build'.";

/// Values substituted for the `%title%`, `%description%`, `%keywords%` and
/// `%og_image%` placeholders of `index.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub og_image: String,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            title: "TaskFlow".to_string(),
            description: "A high-performance boilerplate for unified PHP and React development."
                .to_string(),
            keywords: "php, react, template, eloquent, vite, tailwind".to_string(),
            og_image: String::new(),
        }
    }
}

impl PageMeta {
    pub fn render(&self, html: &str) -> String {
        html.replace("%title%", &self.title)
            .replace("%description%", &self.description)
            .replace("%keywords%", &self.keywords)
            .replace("%og_image%", &self.og_image)
    }
}

pub struct FrontendController {
    dist_path: PathBuf,
    settings: SettingStoreService,
    seo: SeoStoreService,
}

impl FrontendController {
    pub fn new<P: Into<PathBuf>>(
        dist_path: P,
        settings: SettingStoreService,
        seo: SeoStoreService,
    ) -> Self {
        Self {
            dist_path: dist_path.into(),
            settings,
            seo,
        }
    }

    /// Fallback handler: unknown API paths are 404, anything else is an asset or the app shell.
    pub fn fallback(&self, request: &Request, params: &Params) -> Result<Response> {
        if request.is_api_request() {
            return Err(HttpError::not_found("API Endpoint Not Found").into());
        }
        self.serve(request, params)
    }

    pub fn serve(&self, request: &Request, _: &Params) -> Result<Response> {
        let uri = request.path();
        if let Some(asset) = self.asset_path(uri) {
            return Response::file(asset, None);
        }
        let index = self.dist_path.join("index.html");
        if !index.is_file() {
            return Ok(Response::text(NOT_BUILT).with_status(StatusCode::SERVICE_UNAVAILABLE));
        }
        let html = fs::read_to_string(&index)?;
        Ok(Response::html(self.meta(uri)?.render(&html)))
    }

    /// A file under the dist directory, never one that resolves outside of it.
    fn asset_path(&self, uri: &str) -> Option<PathBuf> {
        if uri == "/" {
            return None;
        }
        let resolved = self
            .dist_path
            .join(uri.trim_start_matches('/'))
            .canonicalize()
            .ok()?;
        let root = self.dist_path.canonicalize().ok()?;
        (resolved.is_file() && resolved.starts_with(&root)).then_some(resolved)
    }

    fn meta(&self, uri: &str) -> Result<PageMeta> {
        let defaults = PageMeta::default();
        if self.settings.get_or(ENABLE_DYNAMIC_SEO, "1")? != "1" {
            return Ok(defaults);
        }
        let Some(entry) = self.seo.find_by_path(uri)? else {
            return Ok(defaults);
        };
        Ok(PageMeta {
            title: entry.title.unwrap_or(defaults.title),
            description: entry.description.unwrap_or(defaults.description),
            keywords: entry.keywords.unwrap_or(defaults.keywords),
            og_image: entry.og_image.unwrap_or(defaults.og_image),
        })
    }

    pub fn dist_path(&self) -> &Path {
        &self.dist_path
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::{header, Method};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        http::{Body, HeaderMapExt},
        store::{InMemorySeoStore, InMemorySettingStore, SeoChanges, SeoStore, SettingStore},
        Error,
    };

    const INDEX: &str = "<title>%title%</title><meta content=\"%description%\"><meta content=\"%keywords%\"><meta content=\"%og_image%\">";

    struct Fixture {
        _dir: tempfile::TempDir,
        dist: PathBuf,
        settings: Arc<InMemorySettingStore>,
        seo: Arc<InMemorySeoStore>,
    }

    impl Fixture {
        fn new(with_index: bool) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let dist = dir.path().join("dist");
            fs::create_dir_all(dist.join("assets")).unwrap();
            fs::write(dist.join("assets/app.js"), "console.log(1)").unwrap();
            fs::write(dir.path().join("secret.txt"), "secret").unwrap();
            if with_index {
                fs::write(dist.join("index.html"), INDEX).unwrap();
            }
            Self {
                _dir: dir,
                dist,
                settings: Arc::new(InMemorySettingStore::new()),
                seo: Arc::new(InMemorySeoStore::new()),
            }
        }

        fn controller(&self) -> FrontendController {
            FrontendController::new(&self.dist, self.settings.clone(), self.seo.clone())
        }
    }

    fn get(path: &str) -> Request {
        Request::new(Method::GET, path)
    }

    fn html(response: &Response) -> String {
        String::from_utf8(response.bytes().to_vec()).unwrap()
    }

    #[test]
    fn unknown_api_path_is_not_found() {
        let fixture = Fixture::new(true);
        match fixture.controller().fallback(&get("/api/v2/nothing"), &Params::new()) {
            Err(Error::Http(error)) => {
                assert_eq!(error.status(), StatusCode::NOT_FOUND);
                assert_eq!(error.message(), "API Endpoint Not Found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn serves_existing_assets() {
        let fixture = Fixture::new(true);
        let response = fixture
            .controller()
            .fallback(&get("/assets/app.js"), &Params::new())
            .unwrap();
        assert_eq!(
            response.header_str(header::CONTENT_TYPE),
            Some("application/javascript")
        );
        assert!(matches!(response.body(), Body::File(_)));
    }

    #[test]
    fn does_not_escape_dist_directory() {
        let fixture = Fixture::new(true);
        let response = fixture
            .controller()
            .fallback(&get("/../secret.txt"), &Params::new())
            .unwrap();
        assert_eq!(response.header_str(header::CONTENT_TYPE), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn renders_index_with_defaults() {
        let fixture = Fixture::new(true);
        let response = fixture
            .controller()
            .fallback(&get("/dashboard"), &Params::new())
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            html(&response),
            "<title>TaskFlow</title><meta content=\"A high-performance boilerplate for unified PHP and React development.\"><meta content=\"php, react, template, eloquent, vite, tailwind\"><meta content=\"\">"
        );
    }

    #[test]
    fn renders_seo_entry_for_path_unless_disabled() {
        let fixture = Fixture::new(true);
        fixture
            .seo
            .upsert(SeoChanges {
                path: "/about".to_string(),
                title: Some("About".to_string()),
                ..Default::default()
            })
            .unwrap();
        let controller = fixture.controller();
        let response = controller.fallback(&get("/about"), &Params::new()).unwrap();
        assert!(html(&response).starts_with("<title>About</title>"));

        fixture.settings.set(ENABLE_DYNAMIC_SEO, "0".to_string()).unwrap();
        let response = controller.fallback(&get("/about"), &Params::new()).unwrap();
        assert!(html(&response).starts_with("<title>TaskFlow</title>"));
    }

    #[test]
    fn missing_build_is_service_unavailable() {
        let fixture = Fixture::new(false);
        let response = fixture.controller().fallback(&get("/"), &Params::new()).unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.bytes(), NOT_BUILT.as_bytes());
    }
}
