//! Static page handlers.
//!
//! The landing page introduces the product; the chat page is a minimal
//! client for the JSON API. Both are served as inline HTML — there is no
//! asset pipeline and nothing to build.

use axum::response::Html;

const LANDING_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Let's Talk</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      display: flex; align-items: center; justify-content: center;
      height: 100vh;
    }
    .card {
      text-align: center; padding: 2rem 3rem; max-width: 34rem;
      border: 1px solid #333; border-radius: 12px;
      background: #1a1a1a;
    }
    h1 { font-size: 1.6rem; margin-bottom: 0.5rem; }
    p  { font-size: 0.9rem; color: #888; margin-bottom: 1.25rem; }
    a {
      display: inline-block; padding: 0.5rem 1.5rem;
      border-radius: 8px; background: #2a2a3a; color: #c0c0e0;
      text-decoration: none; font-size: 0.9rem;
      transition: background 0.15s;
    }
    a:hover { background: #3a3a5a; }
  </style>
</head>
<body>
  <div class="card">
    <h1>🎁 Let's Talk</h1>
    <p>Ask one question, hear it answered through the eyes of several
    disciplines — then pick a subject for a deep dive, or set two of them
    debating.</p>
    <a href="/chat">Start talking &rarr;</a>
  </div>
</body>
</html>
"#;

const CHAT_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Let's Talk — Chat</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      max-width: 44rem; margin: 0 auto; padding: 1.5rem 1rem;
    }
    h1 { font-size: 1.2rem; margin-bottom: 1rem; }
    form { display: flex; gap: 0.5rem; margin-bottom: 1.25rem; }
    input {
      flex: 1; padding: 0.5rem 0.75rem; border-radius: 8px;
      border: 1px solid #333; background: #1a1a1a; color: #e0e0e0;
    }
    button {
      padding: 0.5rem 1.25rem; border-radius: 8px; border: none;
      background: #2a2a3a; color: #c0c0e0; cursor: pointer;
    }
    button:hover { background: #3a3a5a; }
    .answer {
      border: 1px solid #333; border-radius: 10px; background: #1a1a1a;
      padding: 0.75rem 1rem; margin-bottom: 0.75rem;
    }
    .answer .who { font-size: 0.85rem; color: #9a9ac0; margin-bottom: 0.3rem; }
    .degraded { color: #c0a060; font-size: 0.75rem; }
  </style>
</head>
<body>
  <h1>🎁 Let's Talk</h1>
  <form id="ask-form">
    <input id="question" placeholder="Ask anything…" autocomplete="off" />
    <button type="submit">Ask</button>
  </form>
  <div id="answers"></div>
  <script>
    const form = document.getElementById('ask-form');
    const answers = document.getElementById('answers');
    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const question = document.getElementById('question').value.trim();
      if (!question) return;
      answers.textContent = 'Thinking…';
      try {
        const resp = await fetch('/api/ask', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ question }),
        });
        const data = await resp.json();
        if (!resp.ok) {
          answers.textContent = data.message || 'Request failed.';
          return;
        }
        answers.innerHTML = '';
        for (const s of data.subjects) {
          const div = document.createElement('div');
          div.className = 'answer';
          const who = document.createElement('div');
          who.className = 'who';
          who.textContent = s.display_name;
          const text = document.createElement('div');
          text.textContent = s.answer;
          div.append(who, text);
          if (s.degraded) {
            const note = document.createElement('div');
            note.className = 'degraded';
            note.textContent = 'fallback answer';
            div.append(note);
          }
          answers.append(div);
        }
      } catch (err) {
        answers.textContent = 'Request failed: ' + err;
      }
    });
  </script>
</body>
</html>
"#;

/// GET / — landing page.
pub(super) async fn landing() -> Html<&'static str> {
    Html(LANDING_HTML)
}

/// GET /chat — minimal chat client.
pub(super) async fn chat_page() -> Html<&'static str> {
    Html(CHAT_HTML)
}
