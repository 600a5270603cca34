//! 测试辅助工具
//!
//! 在内存文件系统中搭建项目，通过 `Weaver` 运行完整流程。

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use weave_vfs::MemoryFileSystem;
use weave_workspace::{ProjectConfig, RunConfig, Weaver};

/// 内存中的项目，根目录为 `/app`
pub struct Project {
    pub fs: Arc<MemoryFileSystem>,
}

impl Project {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            fs: Arc::new(MemoryFileSystem::with_files(
                files
                    .iter()
                    .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec())),
            )),
        }
    }

    /// 按 `/app/weave.json` 构建会话
    pub fn weaver(&self) -> (Weaver, ProjectConfig) {
        let text = self.read("/app/weave.json");
        let project = ProjectConfig::from_json(&text).expect("invalid weave.json");
        let root = PathBuf::from("/app");
        let config = RunConfig::from_project(&project, &root, self.fs.as_ref())
            .expect("invalid project");
        (Weaver::new(self.fs.clone(), config), project)
    }

    pub fn read(&self, path: &str) -> String {
        use weave_vfs::VirtualFileSystem;
        self.fs
            .read_to_string(std::path::Path::new(path))
            .expect("missing file")
    }
}

/// Web ← (Router, Controllers)；Controllers ← DB；DB 构造可能失败
pub const WEB_SOURCES: &[(&str, &str)] = &[
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
	"example.com/app/controllers"
	"example.com/app/router"
)

type Web struct{}

func New(r *router.Router, c *controllers.Controllers) *Web {
	return &Web{}
}
"#,
    ),
    ("/app/cmd/main.go", "package main\n\nfunc main() {}\n"),
];

/// 示例项目加上给定的 weave.json
pub fn web_project(weave_json: &str) -> Project {
    let mut files = WEB_SOURCES.to_vec();
    files.push(("/app/weave.json", weave_json));
    Project::new(&files)
}
