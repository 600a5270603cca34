//! 测试辅助工具
//!
//! 在内存文件系统中搭建示例模块，并提供加载、生成的快捷函数。

#![allow(dead_code)]

use std::sync::Arc;
use weave_core::{
    generate, load, DiError, Finder, ModuleMap, Provider, SourceParser, Target,
};
use weave_vfs::MemoryFileSystem;

pub const APP: &str = "example.com/app";
pub const CMD: &str = "example.com/app/cmd";

/// 内存中的示例项目
pub struct Fixture {
    pub fs: Arc<MemoryFileSystem>,
    pub resolver: ModuleMap,
    pub parser: SourceParser,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let fs = Arc::new(MemoryFileSystem::with_files(
            files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec())),
        ));
        let resolver = ModuleMap::new(fs.clone(), APP, "/app").with_std_dir("/goroot");
        let parser = SourceParser::new(fs.clone());
        Self {
            fs,
            resolver,
            parser,
        }
    }

    pub fn finder(&self) -> Finder<'_> {
        Finder::new(&self.resolver, &self.parser)
    }

    pub fn load(&self, target: &Target) -> Result<weave_core::Graph, DiError> {
        load(&self.finder(), target)
    }

    /// 加载并生成，生成失败视为测试失败
    pub fn provider(&self, target: &Target) -> Result<Provider, DiError> {
        let graph = self.load(target)?;
        Ok(generate(&graph, target).expect("generation failed"))
    }
}

/// Web ← (Router, Controllers)；Controllers ← DB；DB 构造可能失败
pub fn web_app() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/app/go.mod", "module example.com/app\n\ngo 1.22\n"),
        (
            "/app/db/db.go",
            r#"package db

// DB wraps a connection pool.
type DB struct {
	dsn string
}

func NewDB() (*DB, error) {
	return &DB{dsn: "postgres://"}, nil
}
"#,
        ),
        (
            "/app/router/router.go",
            r#"package router

type Router struct{}

func NewRouter() *Router { return &Router{} }
"#,
        ),
        (
            "/app/controllers/controllers.go",
            r#"package controllers

import "example.com/app/db"

type Controllers struct {
	db *db.DB
}

func NewControllers(db *db.DB) *Controllers {
	return &Controllers{db: db}
}
"#,
        ),
        (
            "/app/web/web.go",
            r#"package web

import (
	"net/http"

	"example.com/app/controllers"
	"example.com/app/router"
)

type Web struct {
	Router      *router.Router
	Controllers *controllers.Controllers
	mux         *http.ServeMux
}

func New(r *router.Router, c *controllers.Controllers) *Web {
	return &Web{Router: r, Controllers: c}
}

func (w *Web) ServeHTTP(rw http.ResponseWriter, req *http.Request) {
	w.mux.ServeHTTP(rw, req)
}
"#,
        ),
    ]
}

/// Server ← (Handler, Logger)；Handler ← (Session, Logger)；Session ← (*http.Request, Logger)
pub fn request_app() -> Vec<(&'static str, &'static str)> {
    vec![(
        "/app/server/server.go",
        r#"package server

import "net/http"

type Logger struct{}

func NewLogger() *Logger { return &Logger{} }

type Session struct {
	Request *http.Request
	Logger  *Logger
}

type Handler struct{}

func NewHandler(s *Session, l *Logger) *Handler { return &Handler{} }

type Server struct{}

func NewServer(h *Handler, l *Logger) *Server { return &Server{} }
"#,
    )]
}
