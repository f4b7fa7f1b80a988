//! Requirements fetched from GitHub and plain URLs

use mockito::Server;

use reqrot::app::{self, RequirementsInput, RunOptions};
use reqrot::config::Config;
use reqrot::remote::RemoteClient;
use reqrot::report::ReportOptions;

const SIX_JSON: &str = r#"{
    "info": {"stable_version": "1.9.0"},
    "releases": {
        "1.9.0": [{"upload_time": "2015-01-02T10:00:00"}],
        "1.10.0b1": [{"upload_time": "2015-10-07T11:00:00"}]
    }
}"#;

async fn run_inputs(server_url: &str, inputs: Vec<RequirementsInput>) -> String {
    let mut config = Config::default();
    config.registries.pypi.base_url = server_url.to_string();

    let client = app::build_http_client(&config).unwrap();
    let registries = app::create_default_registries(&config, &client);
    let remote = RemoteClient::with_client(server_url, server_url, client);
    let options = RunOptions {
        inputs,
        source: None,
        report: ReportOptions {
            verbose: true,
            ..Default::default()
        },
    };

    let mut out = Vec::new();
    app::run(&config, &registries, &remote, &options, &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn checks_requirements_from_github_default_branch() {
    let mut server = Server::new_async().await;
    let repo = server
        .mock("GET", "/repos/acme/webapp")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"default_branch": "main"}"#)
        .create_async()
        .await;
    let raw = server
        .mock("GET", "/acme/webapp/main/requirements.txt")
        .with_status(200)
        .with_body("six==1.9.0\n-r other.txt\n")
        .create_async()
        .await;
    let six = server
        .mock("GET", "/pypi/six/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SIX_JSON)
        .create_async()
        .await;

    let inputs = vec![RequirementsInput::GitHub {
        repo: "https://github.com/acme/webapp".to_string(),
        branch: None,
        path: None,
        token: None,
    }];

    let output = run_inputs(&server.url(), inputs).await;

    repo.assert_async().await;
    raw.assert_async().await;
    six.assert_async().await;
    assert_eq!(
        output,
        "six (1.9.0) is up to date\n\
         Looks like you've been keeping up to date, time for a delicious beverage!\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_remote_file_checks_nothing() {
    let mut server = Server::new_async().await;
    let raw = server
        .mock("GET", "/nothing.txt")
        .with_status(404)
        .create_async()
        .await;

    let inputs = vec![RequirementsInput::Url(format!("{}/nothing.txt", server.url()))];

    let output = run_inputs(&server.url(), inputs).await;

    raw.assert_async().await;
    assert_eq!(
        output,
        "Looks like you've been keeping up to date, time for a delicious beverage!\n"
    );
}
