//! BundleServer integration tests


use fixtures::{BASE_MTIME, CountingSource, SourceTree, javascripts_tree, pair_tree, plugin_tree};
use http::StatusCode;
use reinhardt_bundle::{BundleError, BundleRequest, BundleServer};
use rstest::rstest;
use std::sync::Arc;
use std::time::SystemTime;

fn get() -> BundleRequest {
	BundleRequest::new("/javascripts/all.js")
}

#[rstest]
fn test_serves_concatenated_sources(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body.as_ref(), b"var bar;\n\nvar foo;");
	assert_eq!(response.header("Content-Type"), Some("text/javascript"));
	assert_eq!(response.header("Content-Length"), Some("18"));
	assert_eq!(
		response.header("ETag"),
		Some("\"cf3279b0d6bfa4351cae1e7d085164cd\"")
	);
	assert_eq!(
		response.header("Cache-Control"),
		Some("public, must-revalidate")
	);
}

#[rstest]
fn test_serves_javascript_assets_from_directory(javascripts_tree: SourceTree) {
	let server = BundleServer::new([javascripts_tree.pattern("javascripts/*.js")]).unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(response.body.as_ref(), b"var bar;\n\n\nvar foo;");
	assert_eq!(
		response.header("ETag"),
		Some("\"b6d428092bf6479893474f9dd032faeb\"")
	);
}

#[rstest]
fn test_serves_assets_from_application_and_plugin(plugin_tree: SourceTree) {
	let server = BundleServer::new([
		plugin_tree.pattern("javascripts/*.js"),
		plugin_tree.pattern("plugins/foo/javascripts/*.js"),
	])
	.unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(
		response.body.as_ref(),
		b"var bar;\n\n\nvar foo;\n\nvar foo_plugin;"
	);
}

#[rstest]
fn test_serves_assets_from_application_and_all_plugins(plugin_tree: SourceTree) {
	let server = BundleServer::new([
		plugin_tree.pattern("javascripts/*.js"),
		plugin_tree.pattern("plugins/**/javascripts/*.js"),
	])
	.unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(
		response.body.as_ref(),
		b"var bar;\n\n\nvar foo;\n\nvar bar_plugin;\n\nvar foo_plugin;"
	);
}

#[rstest]
fn test_pattern_order_is_preserved(plugin_tree: SourceTree) {
	let server = BundleServer::new([
		plugin_tree.pattern("plugins/foo/javascripts/*.js"),
		plugin_tree.pattern("javascripts/*.js"),
	])
	.unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(
		response.body.as_ref(),
		b"var foo_plugin;\n\nvar bar;\n\n\nvar foo;"
	);
}

#[rstest]
fn test_last_modified_is_newest_source(pair_tree: SourceTree) {
	let newest = pair_tree.touch("b.js", 120);
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(
		response.header("Last-Modified"),
		Some(httpdate::fmt_http_date(newest).as_str())
	);
}

#[rstest]
fn test_updated_file_updates_the_last_modified(javascripts_tree: SourceTree) {
	let server = BundleServer::new([javascripts_tree.pattern("javascripts/*.js")]).unwrap();

	let before = server.handle(&get()).unwrap();
	let again = server.handle(&get()).unwrap();
	assert_eq!(before.header("Last-Modified"), again.header("Last-Modified"));
	let built_before = server.current().unwrap().built_at();

	javascripts_tree.touch("javascripts/bar.js", 10);

	let after = server.handle(&get()).unwrap();
	assert_ne!(before.header("Last-Modified"), after.header("Last-Modified"));
	assert!(server.current().unwrap().built_at() > built_before);
}

#[rstest]
fn test_modified_content_changes_etag(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	let before = server.handle(&get()).unwrap();

	pair_tree.write("b.js", "var fop;");
	pair_tree.touch("b.js", 1);

	let after = server.handle(&get()).unwrap();
	assert_eq!(after.body.as_ref(), b"var bar;\n\nvar fop;");
	assert_ne!(before.header("ETag"), after.header("ETag"));
}

#[rstest]
fn test_not_modified_when_if_modified_since_matches(plugin_tree: SourceTree) {
	let mtime = plugin_tree.touch("plugins/bar/javascripts/bar.js", 30);
	let server = BundleServer::new([
		plugin_tree.pattern("javascripts/*.js"),
		plugin_tree.pattern("plugins/**/javascripts/*.js"),
	])
	.unwrap();

	let response = server
		.handle(&get().with_if_modified_since(httpdate::fmt_http_date(mtime)))
		.unwrap();

	assert_eq!(response.status, StatusCode::NOT_MODIFIED);
	assert!(response.body.is_empty());
}

#[rstest]
fn test_not_modified_keeps_success_headers(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	let ok = server.handle(&get()).unwrap();

	let not_modified = server
		.handle(&get().with_if_none_match(ok.header("ETag").unwrap()))
		.unwrap();

	assert_eq!(not_modified.status, StatusCode::NOT_MODIFIED);
	assert!(not_modified.body.is_empty());
	assert_eq!(not_modified.headers, ok.headers);
}

#[rstest]
fn test_if_modified_since_requires_exact_match(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	let later = SystemTime::UNIX_EPOCH + BASE_MTIME + std::time::Duration::from_secs(3600);

	let response = server
		.handle(&get().with_if_modified_since(httpdate::fmt_http_date(later)))
		.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.body.as_ref(), b"var bar;\n\nvar foo;");
}

#[rstest]
#[case("\"cf3279b0d6bfa4351cae1e7d085164cd\"", StatusCode::NOT_MODIFIED)]
#[case("cf3279b0d6bfa4351cae1e7d085164cd", StatusCode::OK)]
#[case("\"0123456789abcdef0123456789abcdef\"", StatusCode::OK)]
#[case("*", StatusCode::OK)]
fn test_if_none_match(
	pair_tree: SourceTree,
	#[case] if_none_match: &str,
	#[case] expected: StatusCode,
) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();

	let response = server
		.handle(&get().with_if_none_match(if_none_match))
		.unwrap();

	assert_eq!(response.status, expected);
}

#[rstest]
fn test_query_string_md5_sets_expiration_to_the_future(javascripts_tree: SourceTree) {
	let server = BundleServer::new([javascripts_tree.pattern("javascripts/*.js")]).unwrap();
	let etag = server.handle(&get()).unwrap().header("ETag").unwrap().to_string();

	let response = server
		.handle(&get().with_query(etag.trim_matches('"')))
		.unwrap();

	assert_eq!(
		response.header("Cache-Control"),
		Some("public, must-revalidate, max-age=31536000")
	);
}

#[rstest]
#[case(None)]
#[case(Some("v=2"))]
#[case(Some("b6d428092bf6479893474f9dd032fae"))]
fn test_other_query_strings_keep_revalidation(
	javascripts_tree: SourceTree,
	#[case] query: Option<&str>,
) {
	let server = BundleServer::new([javascripts_tree.pattern("javascripts/*.js")]).unwrap();
	let mut request = get();
	if let Some(query) = query {
		request = request.with_query(query);
	}

	let response = server.handle(&request).unwrap();

	let cache_control = response.header("Cache-Control").unwrap();
	assert!(!cache_control.contains("max-age="));
}

#[rstest]
fn test_server_with_no_sources(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.css")]).unwrap();
	assert!(server.is_empty());

	for request in [
		get(),
		get().with_query("anything"),
		get().with_if_none_match("\"cf3279b0d6bfa4351cae1e7d085164cd\""),
	] {
		let response = server.handle(&request).unwrap();
		assert_eq!(response.status, StatusCode::NOT_FOUND);
		assert_eq!(response.header("Content-Type"), Some("text/plain"));
		assert_eq!(response.header("Content-Length"), Some("9"));
		assert_eq!(response.body.as_ref(), b"Not found");
	}
	assert_eq!(server.statistics().not_found, 3);
	assert!(server.current().is_none());
}

#[rstest]
fn test_server_with_no_patterns() {
	let server = BundleServer::new(Vec::<String>::new()).unwrap();

	let response = server.handle(&get()).unwrap();

	assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[rstest]
fn test_if_sources_didnt_change_the_server_shouldnt_rebundle(pair_tree: SourceTree) {
	let source = Arc::new(CountingSource::new());
	let server =
		BundleServer::with_source(Arc::clone(&source), [pair_tree.pattern("*.js")]).unwrap();

	server.handle(&get()).unwrap();
	let reads_after_first = source.reads();
	server.handle(&get()).unwrap();

	assert_eq!(reads_after_first, 2);
	assert_eq!(source.reads(), reads_after_first);
	assert_eq!(server.statistics().rebuilds, 1);
	assert_eq!(server.statistics().requests, 2);
}

#[rstest]
fn test_touch_triggers_single_rebuild(pair_tree: SourceTree) {
	let source = Arc::new(CountingSource::new());
	let server =
		BundleServer::with_source(Arc::clone(&source), [pair_tree.pattern("*.js")]).unwrap();
	server.handle(&get()).unwrap();

	pair_tree.touch("a.js", 5);
	server.handle(&get()).unwrap();
	server.handle(&get()).unwrap();

	assert_eq!(server.statistics().rebuilds, 2);
	assert_eq!(source.reads(), 4);
}

#[rstest]
fn test_files_created_after_startup_are_ignored(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	server.handle(&get()).unwrap();

	pair_tree.write("c.js", "var late;");
	pair_tree.touch("c.js", 60);

	let response = server.handle(&get()).unwrap();
	assert_eq!(response.body.as_ref(), b"var bar;\n\nvar foo;");
	assert_eq!(server.sources().len(), 2);
}

#[rstest]
fn test_deleted_source_is_an_error(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	server.handle(&get()).unwrap();

	pair_tree.remove("b.js");

	let result = server.handle(&get());
	match result {
		Err(BundleError::Io { path, .. }) => assert_eq!(path, pair_tree.path("b.js")),
		other => panic!("expected IO error, got {:?}", other),
	}
}

#[rstest]
fn test_deleted_source_before_first_build(pair_tree: SourceTree) {
	let server = BundleServer::new([pair_tree.pattern("*.js")]).unwrap();
	pair_tree.remove("a.js");

	assert!(matches!(server.handle(&get()), Err(BundleError::Io { .. })));
	assert!(server.current().is_none());
}

#[rstest]
fn test_invalid_pattern_is_rejected(pair_tree: SourceTree) {
	let result = BundleServer::new([pair_tree.pattern("[.js")]);

	assert!(matches!(result, Err(BundleError::Pattern { .. })));
}
