use axum::response::Html;

// Static shells for the admin UI; data comes from /api/admin/*

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin Login</title></head>
<body>
  <h1>Admin Login</h1>
  <form id="login">
    <input type="email" name="email" placeholder="Email" required>
    <input type="password" name="password" placeholder="Password" required>
    <button type="submit">Login</button>
  </form>
  <p id="status"></p>
  <script>
    document.getElementById('login').addEventListener('submit', async (e) => {
      e.preventDefault();
      const form = new FormData(e.target);
      const res = await fetch('/api/auth/login', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ email: form.get('email'), password: form.get('password') }),
      });
      const body = await res.json();
      if (res.ok) { window.location = '/admin'; return; }
      document.getElementById('status').textContent = body.error;
    });
  </script>
</body>
</html>
"#;

const ERROR_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign-in Error</title></head>
<body>
  <h1>Sign-in failed</h1>
  <p>Your account is not allowed to access the admin area.</p>
  <a href="/admin/login">Back to login</a>
</body>
</html>
"#;

const DASHBOARD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin Panel</title></head>
<body>
  <h1>Admin Panel</h1>
  <table id="posts"><thead><tr><th>Title</th><th>Category</th><th>Date</th></tr></thead><tbody></tbody></table>
  <script>
    fetch('/api/admin/posts').then((r) => r.json()).then((posts) => {
      const body = document.querySelector('#posts tbody');
      for (const p of posts) {
        const row = body.insertRow();
        for (const v of [p.title, p.category, p.date]) row.insertCell().textContent = v;
      }
    });
  </script>
</body>
</html>
"#;

pub async fn login_page_handler() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn error_page_handler() -> Html<&'static str> {
    Html(ERROR_PAGE)
}

pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}
