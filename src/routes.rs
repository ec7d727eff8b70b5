//! Demo application routes.
//!
//! Mirrors the routing guide: closures, controller actions, nested and
//! prefixed captures, an authenticated dashboard and a product resource.

use corex::http::middleware::RequireSession;
use corex::{Application, BuildError, Controller, Handler, HandlerError, HandlerResult, Method, Request};

pub fn register(app: &mut Application) -> Result<(), BuildError> {
    app.use_sessions();
    app.middleware("auth", RequireSession::new("user_id").redirect_to("/login"));

    app.controller("HomeController", HomeController)
        .controller("UserController", UserController)
        .controller("CommentController", CommentController)
        .controller("PageController", PageController)
        .controller("ProfileController", ProfileController)
        .controller("CollectionController", CollectionController)
        .controller("DashboardController", DashboardController)
        .controller("ProductController", ProductController);

    app.router()
        .get("/", Handler::inline(|_, _| Ok("Welcome to CoreX!".to_string())))?
        .get("/home", Handler::action("HomeController", "index"))?
        .get("/user/{id}", Handler::action("UserController", "show"))?
        .get(
            "/post/{postId}/comment/{commentId}",
            Handler::action("CommentController", "show"),
        )?
        .get("/page/{slug}", Handler::action("PageController", "show"))?
        .get("/profile/@{username}", Handler::action("ProfileController", "show"))?
        .get(
            "/collections/~{collectionId}",
            Handler::action("CollectionController", "show"),
        )?
        .register(
            Method::Get,
            "/dashboard",
            Handler::action("DashboardController", "index"),
            &["auth"],
        )?
        .get("/login", Handler::inline(login))?
        .get("/logout", Handler::inline(logout))?
        .resource_with_param("products", "product", "ProductController")?;

    Ok(())
}

fn login(request: &Request, _: &corex::RouteParams) -> HandlerResult {
    let session = request.session.as_ref().ok_or("session middleware not installed")?;
    session.set("user_id", "demo".into());
    Ok("Logged in as demo".to_string())
}

fn logout(request: &Request, _: &corex::RouteParams) -> HandlerResult {
    if let Some(session) = &request.session {
        session.destroy();
    }
    Ok("Logged out".to_string())
}

fn arg<'a>(args: &[&'a str], index: usize) -> Result<&'a str, HandlerError> {
    args.get(index)
        .copied()
        .ok_or_else(|| HandlerError::Failed(format!("missing route argument {}", index)))
}

fn unknown(controller: &str, action: &str) -> HandlerError {
    HandlerError::UnknownAction {
        controller: controller.to_string(),
        action: action.to_string(),
    }
}

struct HomeController;

impl Controller for HomeController {
    fn actions(&self) -> &[&'static str] {
        &["index"]
    }

    fn call(&self, action: &str, _: &Request, _: &[&str]) -> HandlerResult {
        match action {
            "index" => Ok("<h1>Home</h1>".to_string()),
            _ => Err(unknown("HomeController", action)),
        }
    }
}

struct UserController;

impl Controller for UserController {
    fn actions(&self) -> &[&'static str] {
        &["show"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "show" => Ok(format!("user:{}", arg(args, 0)?)),
            _ => Err(unknown("UserController", action)),
        }
    }
}

struct CommentController;

impl Controller for CommentController {
    fn actions(&self) -> &[&'static str] {
        &["show"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "show" => Ok(format!(
                "post {} / comment {}",
                arg(args, 0)?,
                arg(args, 1)?
            )),
            _ => Err(unknown("CommentController", action)),
        }
    }
}

struct PageController;

impl Controller for PageController {
    fn actions(&self) -> &[&'static str] {
        &["show"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "show" => Ok(format!("<h1>{}</h1>", arg(args, 0)?)),
            _ => Err(unknown("PageController", action)),
        }
    }
}

struct ProfileController;

impl Controller for ProfileController {
    fn actions(&self) -> &[&'static str] {
        &["show"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "show" => Ok(format!("profile of @{}", arg(args, 0)?)),
            _ => Err(unknown("ProfileController", action)),
        }
    }
}

struct CollectionController;

impl Controller for CollectionController {
    fn actions(&self) -> &[&'static str] {
        &["show"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "show" => Ok(format!("collection ~{}", arg(args, 0)?)),
            _ => Err(unknown("CollectionController", action)),
        }
    }
}

struct DashboardController;

impl Controller for DashboardController {
    fn actions(&self) -> &[&'static str] {
        &["index"]
    }

    fn call(&self, action: &str, request: &Request, _: &[&str]) -> HandlerResult {
        match action {
            "index" => {
                let user = request
                    .session
                    .as_ref()
                    .and_then(|s| s.get("user_id"))
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                Ok(format!("Dashboard for {}", user))
            }
            _ => Err(unknown("DashboardController", action)),
        }
    }
}

struct ProductController;

impl Controller for ProductController {
    fn actions(&self) -> &[&'static str] {
        &["index", "create", "store", "show", "edit", "update", "destroy"]
    }

    fn call(&self, action: &str, _: &Request, args: &[&str]) -> HandlerResult {
        match action {
            "index" => Ok("products".to_string()),
            "create" => Ok("new product form".to_string()),
            "store" => Ok("product stored".to_string()),
            "show" => Ok(format!("product {}", arg(args, 0)?)),
            "edit" => Ok(format!("edit product {}", arg(args, 0)?)),
            "update" => Ok(format!("product {} updated", arg(args, 0)?)),
            "destroy" => Ok(format!("product {} deleted", arg(args, 0)?)),
            _ => Err(unknown("ProductController", action)),
        }
    }
}
