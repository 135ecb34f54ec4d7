//! Static page handlers.

use actix_web::HttpResponse;
use paperclip::actix::api_v2_operation;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Gatewatch - Sign In</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            background: #f5f5f5;
            color: #333;
        }
        .card {
            max-width: 360px;
            margin: 80px auto;
            padding: 24px;
            background: #fff;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            border-radius: 8px;
        }
        h1 { text-align: center; font-size: 1.4em; }
        label { display: block; margin-top: 12px; }
        input {
            width: 100%;
            padding: 8px;
            margin-top: 4px;
            box-sizing: border-box;
        }
        button {
            width: 100%;
            margin-top: 16px;
            padding: 10px;
        }
        #status { margin-top: 12px; text-align: center; }
    </style>
</head>
<body>
    <div class="card">
        <h1>Sign In</h1>
        <label>Username <input id="username" autocomplete="username"></label>
        <label>Password <input id="password" type="password" autocomplete="current-password"></label>
        <button onclick="submitLogin()">Log in</button>
        <div id="status"></div>
    </div>
    <script>
        async function submitLogin() {
            const body = {
                username: document.getElementById('username').value,
                password: document.getElementById('password').value
            };
            const status = document.getElementById('status');
            try {
                const resp = await fetch('/api/login', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify(body)
                });
                const data = await resp.json();
                status.textContent = data.message || resp.statusText;
            } catch (err) {
                status.textContent = 'Request failed: ' + err;
            }
        }
    </script>
</body>
</html>"#;

/// Login page
///
/// Serves the static login form posting to the login endpoint.
#[api_v2_operation(
    summary = "Login Page",
    description = "Serves the static login page.",
    tags("Pages"),
    responses(
        (status = 200, description = "Successful response")
    )
)]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html")
        .body(LOGIN_PAGE)
}
