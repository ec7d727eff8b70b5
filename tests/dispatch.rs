//! End-to-end dispatch tests: bootstrap, matching, middleware and failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use corex::http::middleware::{from_fn, RequireSession};
use corex::{
    AppContext, Application, BuildError, Decision, Handler, HandlerError, Method, Request,
    Response,
};

mod common;
use common::{
    app_with_logger, app_with_pages, EchoController, PanickingLogger, PanickingRenderer,
    RecordingLogger, RESOURCE,
};

fn user_app() -> Application {
    let (mut app, _) = app_with_logger();
    app.router()
        .get(
            "/user/{id}",
            Handler::inline(|_, p| Ok(format!("user:{}", &p["id"]))),
        )
        .unwrap();
    app
}

#[test]
fn test_single_capture() {
    let dispatcher = user_app().build().unwrap();
    assert_eq!(dispatcher.resolve("GET", "/user/42"), "user:42");
    assert_eq!(dispatcher.resolve("GET", "/user/42/"), "user:42");
}

#[test]
fn test_missing_segment_is_not_found() {
    let dispatcher = user_app().build().unwrap();
    let response = dispatcher.dispatch(Request::new("GET", "/user/"));
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Error 404");
}

#[test]
fn test_matching_is_case_sensitive() {
    let dispatcher = user_app().build().unwrap();
    assert_eq!(
        dispatcher.dispatch(Request::new("GET", "/User/42")).status,
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_method_must_match() {
    let dispatcher = user_app().build().unwrap();
    assert_eq!(
        dispatcher.dispatch(Request::new("POST", "/user/42")).status,
        StatusCode::NOT_FOUND
    );
    // Verbs are parsed case-insensitively.
    assert_eq!(dispatcher.resolve("get", "/user/42"), "user:42");
}

#[test]
fn test_nested_params_in_order() {
    let (mut app, _) = app_with_logger();
    app.controller(
        "CommentController",
        EchoController {
            name: "CommentController",
            actions: &["show"],
        },
    );
    app.router()
        .get(
            "/post/{postId}/comment/{commentId}",
            Handler::action("CommentController", "show"),
        )
        .unwrap()
        .get(
            "/a/{x}/b/{y}",
            Handler::inline(|_, p| {
                let pairs: Vec<String> = p.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                Ok(pairs.join("&"))
            }),
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(
        dispatcher.resolve("GET", "/post/7/comment/99"),
        "CommentController@show:7,99"
    );
    assert_eq!(dispatcher.resolve("GET", "/a/1/b/2"), "x=1&y=2");
}

#[test]
fn test_prefixed_captures() {
    let (mut app, _) = app_with_logger();
    app.router()
        .get(
            "/profile/@{username}",
            Handler::inline(|_, p| Ok(format!("@{}", &p["username"]))),
        )
        .unwrap()
        .get(
            "/collections/~{collectionId}",
            Handler::inline(|_, p| Ok(format!("~{}", &p["collectionId"]))),
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.resolve("GET", "/profile/@alice"), "@alice");
    assert_eq!(dispatcher.resolve("GET", "/collections/~summer"), "~summer");
    assert_eq!(
        dispatcher.dispatch(Request::new("GET", "/profile/alice")).status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        dispatcher.dispatch(Request::new("GET", "/profile/@")).status,
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_first_registered_route_wins() {
    let (mut app, _) = app_with_logger();
    app.router()
        .get("/items/create", Handler::inline(|_, _| Ok("create".into())))
        .unwrap()
        .get("/items/{id}", Handler::inline(|_, p| Ok(format!("show {}", &p["id"]))))
        .unwrap()
        .get("/other/{id}", Handler::inline(|_, _| Ok("capture".into())))
        .unwrap()
        .get("/other/create", Handler::inline(|_, _| Ok("literal".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.resolve("GET", "/items/create"), "create");
    assert_eq!(dispatcher.resolve("GET", "/items/5"), "show 5");
    assert_eq!(dispatcher.resolve("GET", "/other/create"), "capture");
}

#[test]
fn test_root_route() {
    let (mut app, _) = app_with_logger();
    app.router()
        .get("/", Handler::inline(|_, _| Ok("welcome".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.resolve("GET", "/"), "welcome");
    assert_eq!(dispatcher.resolve("GET", ""), "welcome");
    assert_eq!(
        dispatcher.dispatch(Request::new("GET", "//")).status,
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_resource_routes() {
    let (mut app, _) = app_with_logger();
    app.controller(
        "PhotoController",
        EchoController {
            name: "PhotoController",
            actions: RESOURCE,
        },
    );
    app.router().resource("photos", "PhotoController").unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.routes().len(), 7);
    let cases = [
        ("GET", "/photos", "PhotoController@index:"),
        ("GET", "/photos/create", "PhotoController@create:"),
        ("POST", "/photos", "PhotoController@store:"),
        ("GET", "/photos/3", "PhotoController@show:3"),
        ("GET", "/photos/3/edit", "PhotoController@edit:3"),
        ("PUT", "/photos/3", "PhotoController@update:3"),
        ("PATCH", "/photos/3", "PhotoController@update:3"),
        ("DELETE", "/photos/3", "PhotoController@destroy:3"),
    ];
    for (method, path, expected) in cases {
        assert_eq!(dispatcher.resolve(method, path), expected, "{} {}", method, path);
    }
}

#[test]
fn test_resource_with_custom_param() {
    let (mut app, _) = app_with_logger();
    app.controller(
        "ProductController",
        EchoController {
            name: "ProductController",
            actions: RESOURCE,
        },
    );
    app.router()
        .resource_with_param("products", "product", "ProductController")
        .unwrap();
    let dispatcher = app.build().unwrap();

    let route = &dispatcher.routes().routes()[3];
    assert_eq!(route.pattern().source(), "/products/{product}");
    assert_eq!(
        dispatcher.resolve("DELETE", "/products/9"),
        "ProductController@destroy:9"
    );
}

#[test]
fn test_global_short_circuit_skips_matching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (mut app, _) = app_with_logger();
    app.use_middleware(from_fn("maintenance", |_req, _res| {
        Ok(Decision::ShortCircuit(Response::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "down",
        )))
    }));
    let counter = calls.clone();
    app.router()
        .get(
            "/user/{id}",
            Handler::inline(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("handled".into())
            }),
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    for path in ["/user/1", "/nowhere"] {
        let response = dispatcher.dispatch(Request::new("GET", path));
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, "down");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_middleware_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (mut app, _) = app_with_logger();

    for name in ["g1", "g2"] {
        let log = log.clone();
        app.use_middleware(from_fn(name, move |_req, _res| {
            log.lock().unwrap().push(name);
            Ok(Decision::Continue)
        }));
    }
    for name in ["r1", "r2"] {
        let log = log.clone();
        app.middleware(
            name,
            from_fn(name, move |_req, _res| {
                log.lock().unwrap().push(name);
                Ok(Decision::Continue)
            }),
        );
    }
    let handler_log = log.clone();
    app.router()
        .register(
            Method::Get,
            "/x",
            Handler::inline(move |_, _| {
                handler_log.lock().unwrap().push("handler");
                Ok("ok".into())
            }),
            &["r2", "r1"],
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.resolve("GET", "/x"), "ok");
    assert_eq!(*log.lock().unwrap(), vec!["g1", "g2", "r2", "r1", "handler"]);

    log.lock().unwrap().clear();
    dispatcher.dispatch(Request::new("GET", "/missing"));
    assert_eq!(*log.lock().unwrap(), vec!["g1", "g2"]);
}

#[test]
fn test_route_middleware_short_circuit() {
    let (mut app, _) = app_with_logger();
    app.use_sessions();
    app.middleware("auth", RequireSession::new("user_id").redirect_to("/login"));
    app.router()
        .register(
            Method::Get,
            "/dashboard",
            Handler::inline(|_, _| Ok("dashboard".into())),
            &["auth"],
        )
        .unwrap()
        .get(
            "/login",
            Handler::inline(|req, _| {
                let session = req.session.as_ref().ok_or("no session")?;
                session.set("user_id", "u1".into());
                Ok("logged in".into())
            }),
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    let denied = dispatcher.dispatch(Request::new("GET", "/dashboard"));
    assert_eq!(denied.status, StatusCode::FOUND);
    assert_eq!(denied.header("location"), Some("/login"));

    let login = dispatcher.dispatch(Request::new("GET", "/login"));
    assert_eq!(login.body, "logged in");
    let cookie = login.header("set-cookie").unwrap();
    let pair = cookie.split(';').next().unwrap().to_string();

    let allowed = dispatcher.dispatch(Request::new("GET", "/dashboard").with_header("cookie", &pair));
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body, "dashboard");
    assert!(allowed.header("set-cookie").is_none());
}

#[test]
fn test_short_circuit_keeps_session_cookie() {
    let (mut app, _) = app_with_logger();
    app.use_sessions();
    app.middleware("auth", RequireSession::new("user_id").redirect_to("/login"));
    app.router()
        .register(
            Method::Get,
            "/dashboard",
            Handler::inline(|_, _| Ok("dashboard".into())),
            &["auth"],
        )
        .unwrap();
    let dispatcher = app.build().unwrap();

    let denied = dispatcher.dispatch(Request::new("GET", "/dashboard"));
    assert_eq!(denied.status, StatusCode::FOUND);
    assert_eq!(denied.header("location"), Some("/login"));
    assert!(denied
        .header("set-cookie")
        .is_some_and(|c| c.starts_with("COREXSESSID=")));
}

#[test]
fn test_regenerated_session_survives_next_request() {
    let (mut app, _) = app_with_logger();
    app.use_sessions();
    app.router()
        .get(
            "/login",
            Handler::inline(|req, _| {
                let session = req.session.as_ref().ok_or("no session")?;
                session.set("user_id", "u1".into());
                Ok(session.regenerate_id())
            }),
        )
        .unwrap()
        .get(
            "/me",
            Handler::inline(|req, _| {
                let user = req
                    .session
                    .as_ref()
                    .and_then(|s| s.get("user_id"))
                    .and_then(|v| v.as_str().map(str::to_string));
                Ok(user.unwrap_or_else(|| "guest".to_string()))
            }),
        )
        .unwrap();
    let dispatcher = app.build().unwrap();
    let cookie_for = |id: &str| format!("COREXSESSID={}; Path=/; HttpOnly", id);

    let login = dispatcher.dispatch(Request::new("GET", "/login"));
    let new_id = login.body.clone();
    assert_eq!(login.header("set-cookie"), Some(cookie_for(&new_id).as_str()));

    let me = dispatcher.dispatch(
        Request::new("GET", "/me").with_header("cookie", format!("COREXSESSID={}", new_id)),
    );
    assert_eq!(me.body, "u1");
    assert!(me.header("set-cookie").is_none());

    // A returning client that logs in again gets the rotated ID back.
    let again = dispatcher.dispatch(
        Request::new("GET", "/login").with_header("cookie", format!("COREXSESSID={}", new_id)),
    );
    assert_ne!(again.body, new_id);
    assert_eq!(again.header("set-cookie"), Some(cookie_for(&again.body).as_str()));

    let stale = dispatcher.dispatch(
        Request::new("GET", "/me").with_header("cookie", format!("COREXSESSID={}", new_id)),
    );
    assert_eq!(stale.body, "guest");
}

#[test]
fn test_handler_error_is_logged_once() {
    let (mut app, logger) = app_with_logger();
    app.router()
        .get("/boom", Handler::inline(|_, _| Err("database unavailable".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    let response = dispatcher.dispatch(Request::new("GET", "/boom"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Error 500");
    assert!(!response.body.contains("database"));
    assert_eq!(logger.entries(), vec!["database unavailable".to_string()]);
}

#[test]
fn test_middleware_error_is_500() {
    let (mut app, logger) = app_with_logger();
    app.use_middleware(from_fn("broken", |_req, _res| {
        Err(HandlerError::Middleware {
            name: "broken".into(),
            reason: "no backend".into(),
        })
    }));
    let dispatcher = app.build().unwrap();

    let response = dispatcher.dispatch(Request::new("GET", "/anything"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(logger.entries().len(), 1);
    assert!(logger.entries()[0].contains("no backend"));
}

#[test]
fn test_panic_is_contained() {
    let (mut app, logger) = app_with_logger();
    app.router()
        .get("/panic", Handler::inline(|_, _| panic!("handler bug")))
        .unwrap()
        .get("/fine", Handler::inline(|_, _| Ok("fine".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    let response = dispatcher.dispatch(Request::new("GET", "/panic"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(logger.entries(), vec!["panicked: handler bug".to_string()]);

    assert_eq!(dispatcher.resolve("GET", "/fine"), "fine");
}

#[test]
fn test_panicking_logger_still_renders_500() {
    let context = AppContext {
        logger: Arc::new(PanickingLogger),
        ..AppContext::default()
    };
    let mut app = Application::new(context);
    app.router()
        .get("/boom", Handler::inline(|_, _| Err("fail".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    let response = dispatcher.dispatch(Request::new("GET", "/boom"));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "Error 500");
}

#[test]
fn test_panicking_renderer_falls_back_to_plain_page() {
    let logger = Arc::new(RecordingLogger::default());
    let context = AppContext {
        logger: logger.clone(),
        views: Arc::new(PanickingRenderer),
        ..AppContext::default()
    };
    let mut app = Application::new(context);
    app.router()
        .get("/boom", Handler::inline(|_, _| Err("fail".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    let failed = dispatcher.dispatch(Request::new("GET", "/boom"));
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.body, "Error 500");

    // The 404 page panics inside the boundary and becomes a 500.
    let missing = dispatcher.dispatch(Request::new("GET", "/missing"));
    assert_eq!(missing.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(missing.body, "Error 500");
    assert_eq!(
        logger.entries(),
        vec!["fail".to_string(), "panicked: renderer exploded".to_string()]
    );
}

#[test]
fn test_error_pages_used_when_present() {
    let (mut app, _) = app_with_pages();
    app.router()
        .get("/boom", Handler::inline(|_, _| Err("fail".into())))
        .unwrap();
    let dispatcher = app.build().unwrap();

    assert_eq!(dispatcher.resolve("GET", "/missing"), "<h1>Not Found</h1>");
    assert_eq!(dispatcher.resolve("GET", "/boom"), "<h1>Server Error</h1>");
}

#[test]
fn test_dispatch_is_idempotent() {
    let dispatcher = user_app().build().unwrap();
    let first = dispatcher.dispatch(Request::new("GET", "/user/42"));
    let second = dispatcher.dispatch(Request::new("GET", "/user/42"));
    assert_eq!(first, second);
}

#[test]
fn test_invalid_pattern_fails_registration() {
    let (mut app, _) = app_with_logger();
    let err = app
        .router()
        .get("/user/{id", Handler::inline(|_, _| Ok(String::new())))
        .unwrap_err();
    let err: BuildError = err.into();
    assert!(matches!(err, BuildError::Pattern(_)));
}

#[test]
fn test_unknown_middleware_fails_build() {
    let (mut app, _) = app_with_logger();
    app.router()
        .register(
            Method::Get,
            "/x",
            Handler::inline(|_, _| Ok(String::new())),
            &["auth"],
        )
        .unwrap();

    match app.build() {
        Err(BuildError::UnknownMiddleware { name, .. }) => assert_eq!(name, "auth"),
        other => panic!("unexpected: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_controller_and_action_fail_build() {
    let (mut app, _) = app_with_logger();
    app.router()
        .get("/x", Handler::action("MissingController", "index"))
        .unwrap();
    assert!(matches!(
        app.build(),
        Err(BuildError::UnknownController { .. })
    ));

    let (mut app, _) = app_with_logger();
    app.controller(
        "HomeController",
        EchoController {
            name: "HomeController",
            actions: &["index"],
        },
    );
    app.router()
        .get("/x", Handler::action("HomeController", "about"))
        .unwrap();
    match app.build() {
        Err(BuildError::UnknownAction { action, .. }) => assert_eq!(action, "about"),
        other => panic!("unexpected: {:?}", other.map(|_| ())),
    }
}
