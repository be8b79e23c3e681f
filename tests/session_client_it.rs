//! Session client against a mock backend. Needs the `test` feature, which is off by default:
//! run with `cargo test --features test`; a plain `cargo test` skips this suite.

// std
use std::time::Duration as StdDuration;
// crates.io
use futures::future::{AbortHandle, join_all};
use httpmock::prelude::*;
// self
use rental_api_client::{
	_preludet::*,
	auth::CredentialPair,
	client::{ApiClient, ApiFuture, SessionClient},
	error::Error,
	http::{ApiResponse, RequestOptions},
	reqwest::Method,
};

#[derive(Debug, Deserialize, PartialEq)]
struct Car {
	plate: String,
	seats: u8,
}

fn session(server: &MockServer) -> SessionClient {
	let client = build_test_session_client(&server.base_url());

	client.install_credentials(&CredentialPair::new("access-1", "refresh-1"));

	client
}

async fn mock_renewal(server: &MockServer, status: u16, delay_ms: u64) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh").header_exists("cookie");
			then.status(status)
				.header("set-cookie", "access_token=access-2; Path=/; HttpOnly")
				.delay(StdDuration::from_millis(delay_ms));
		})
		.await
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_renewal() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-1");
			then.status(401).body("{\"message\":\"Access token expired\"}");
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"plate\":\"RC-101\",\"seats\":5}]");
		})
		.await;
	let renewal = mock_renewal(&server, 200, 300).await;
	let results = join_all((0..10).map(|_| client.get::<Vec<Car>>("/api/cars"))).await;

	for result in results {
		let cars = result
			.expect("Every call should succeed after the shared renewal.")
			.into_option()
			.expect("Fleet listing should carry a body.");

		assert_eq!(cars, vec![Car { plate: "RC-101".into(), seats: 5 }]);
	}

	renewal.assert_calls_async(1).await;
	rejected.assert_calls_async(10).await;
	accepted.assert_calls_async(10).await;

	assert_eq!(client.renewal_metrics.attempts(), 1);
	assert_eq!(client.renewal_metrics.successes(), 1);
	assert!(!client.renewal_in_flight());
}

#[tokio::test]
async fn retried_call_is_never_renewed_twice() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let rentals = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/rentals");
			then.status(401).body("{\"message\":\"Session revoked\"}");
		})
		.await;
	let renewal = mock_renewal(&server, 200, 0).await;
	let err = client
		.get::<serde_json::Value>("/api/rentals")
		.await
		.expect_err("A second rejection after renewal should surface to the caller.");

	assert_eq!(err.status(), Some(401));
	assert_eq!(err.as_api().map(|api| api.message.as_str()), Some("Session revoked"));

	rentals.assert_calls_async(2).await;
	renewal.assert_calls_async(1).await;
}

#[tokio::test]
async fn refused_renewal_surfaces_original_rejection() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let damages = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/damages");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"Access token expired\",\"path\":\"/api/damages\"}");
		})
		.await;
	let renewal = mock_renewal(&server, 400, 0).await;
	let err = client
		.get::<serde_json::Value>("/api/damages")
		.await
		.expect_err("Refused renewal should surface the original rejection.");
	let api = err.as_api().expect("Rejection should be a structured API error.");

	assert_eq!(api.status, 401);
	assert_eq!(api.message, "Access token expired");
	assert_eq!(api.path.as_deref(), Some("/api/damages"));

	damages.assert_calls_async(1).await;
	renewal.assert_calls_async(1).await;

	assert_eq!(client.renewal_metrics.failures(), 1);
}

#[tokio::test]
async fn auth_endpoints_never_trigger_renewal() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(401).body("{\"message\":\"Bad credentials\"}");
		})
		.await;
	let renewal = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(401);
		})
		.await;
	let err = client
		.post::<serde_json::Value, _>(
			"/api/auth/login",
			&serde_json::json!({ "username": "clerk", "password": "wrong" }),
		)
		.await
		.expect_err("Failed login should surface directly.");

	assert_eq!(err.as_api().map(|api| api.message.as_str()), Some("Bad credentials"));

	let err = client
		.post::<serde_json::Value, _>("/api/auth/refresh", &serde_json::json!({}))
		.await
		.expect_err("Rejected renewal call should surface directly.");

	assert_eq!(err.status(), Some(401));

	login.assert_calls_async(1).await;
	renewal.assert_calls_async(1).await;

	assert_eq!(client.renewal_metrics.attempts(), 0);
}

#[tokio::test]
async fn no_content_and_unparsable_errors_are_normalized() {
	let server = MockServer::start_async().await;
	let client = session(&server);

	server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/cars/7");
			then.status(204);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/reports");
			then.status(502).body("<html>upstream down</html>");
		})
		.await;

	let deleted = client
		.delete::<serde_json::Value>("/api/cars/7")
		.await
		.expect("Deleting a car should succeed.");

	assert_eq!(deleted, ApiResponse::NoContent);

	let err = client
		.get::<serde_json::Value>("/api/reports")
		.await
		.expect_err("Gateway failures should surface as API errors.");
	let api = err.as_api().expect("Gateway failure should be a structured API error.");

	assert_eq!(api.status, 502);
	assert_eq!(api.message, "Bad Gateway");
	assert!(api.errors.is_none());
}

#[tokio::test]
async fn aborted_call_resolves_without_waiting_for_backend() {
	let server = MockServer::start_async().await;
	let client = session(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/availability");
			then.status(200).body("[]").delay(StdDuration::from_secs(2));
		})
		.await;

	let (handle, registration) = AbortHandle::new_pair();
	let options = RequestOptions::new(Method::GET).with_abort(registration);
	let (result, _) = tokio::join!(
		client.request::<Vec<Car>>("/api/availability", options),
		async {
			tokio::time::sleep(StdDuration::from_millis(20)).await;
			handle.abort();
		}
	);

	assert!(matches!(result, Err(Error::Aborted)));
}

#[tokio::test]
async fn cleared_session_sends_no_credentials() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let anonymous = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars/public").header_missing("cookie");
			then.status(200).body("[]");
		})
		.await;

	client.clear_credentials();

	let cars = client
		.get::<Vec<Car>>("/api/cars/public")
		.await
		.expect("Public listing should succeed without credentials.");

	assert_eq!(cars.into_option(), Some(Vec::new()));

	anonymous.assert_calls_async(1).await;
}

#[tokio::test]
async fn aborted_waiter_leaves_shared_renewal_to_the_others() {
	let server = MockServer::start_async().await;
	let client = session(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-1");
			then.status(401);
		})
		.await;

	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-2");
			then.status(200).body("[]");
		})
		.await;
	let renewal = mock_renewal(&server, 200, 300).await;
	let (handle, registration) = AbortHandle::new_pair();
	let mut calls: Vec<ApiFuture<'_, Vec<Car>>> =
		(0..3).map(|_| client.get::<Vec<Car>>("/api/cars")).collect();

	calls.push(
		client.request("/api/cars", RequestOptions::new(Method::GET).with_abort(registration)),
	);

	let (results, _) = tokio::join!(join_all(calls), async {
		tokio::time::sleep(StdDuration::from_millis(100)).await;
		handle.abort();
	});
	let succeeded = results.iter().filter(|result| result.is_ok()).count();
	let aborted = results.iter().filter(|result| matches!(result, Err(Error::Aborted))).count();

	assert_eq!((succeeded, aborted), (3, 1));
	assert!(!client.renewal_in_flight());

	renewal.assert_calls_async(1).await;
	accepted.assert_calls_async(3).await;
}

#[tokio::test]
async fn renewal_completes_after_its_only_caller_aborts() {
	let server = MockServer::start_async().await;
	let client = session(&server);
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-1");
			then.status(401);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/cars").header("cookie", "access_token=access-2");
			then.status(200).body("[]");
		})
		.await;
	let renewal = mock_renewal(&server, 200, 200).await;
	let (handle, registration) = AbortHandle::new_pair();
	let options = RequestOptions::new(Method::GET).with_abort(registration);
	let (result, _) = tokio::join!(client.request::<Vec<Car>>("/api/cars", options), async {
		tokio::time::sleep(StdDuration::from_millis(80)).await;
		handle.abort();
	});

	assert!(matches!(result, Err(Error::Aborted)));

	tokio::time::sleep(StdDuration::from_millis(600)).await;

	assert!(!client.renewal_in_flight());
	assert_eq!(client.renewal_metrics.successes(), 1);
	assert_eq!(client.renewal_metrics.pending(), 0);

	client.get::<Vec<Car>>("/api/cars").await.expect("Rotated session cookie should be accepted.");

	renewal.assert_calls_async(1).await;
	rejected.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;
}
