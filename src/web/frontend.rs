//! Embedded HTML/CSS/JS frontend for the aidash web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant. It holds
//! no state of its own beyond form inputs: every action calls the JSON API
//! and re-renders from the state it returns.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app {
  max-width: 1200px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 {
  font-size: 24px;
  font-weight: 600;
  display: flex;
  align-items: center;
  gap: 10px;
}

header h1 .logo {
  color: var(--accent);
  font-family: var(--mono);
  font-weight: 700;
}

header .subtitle {
  color: var(--text-muted);
  font-size: 13px;
}

.header-right {
  display: flex;
  align-items: center;
  gap: 12px;
}

/* Navigation */
nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}

nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
  transition: all 0.15s;
}

nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}

.card h2 {
  font-size: 16px;
  font-weight: 600;
  margin-bottom: 16px;
}

.card h3 {
  font-size: 14px;
  font-weight: 600;
  margin-bottom: 8px;
}

.card p.muted { color: var(--text-muted); font-size: 13px; }

.section-head {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 16px;
}

/* Model grid */
.model-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
  gap: 16px;
}

.model-card .type {
  font-size: 11px;
  font-family: var(--mono);
  color: var(--purple);
  letter-spacing: 0.5px;
}

.model-card .actions {
  display: flex;
  gap: 8px;
  margin-top: 12px;
}

/* Stats grid */
.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}

.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}

.stat-card .value {
  font-size: 32px;
  font-weight: 700;
  font-family: var(--mono);
  color: var(--accent);
  line-height: 1.1;
}

.stat-card .value.green { color: var(--green); }
.stat-card .value.purple { color: var(--purple); }

.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 6px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

/* Tables */
table {
  width: 100%;
  border-collapse: collapse;
  font-size: 13px;
}

th, td {
  text-align: left;
  padding: 8px 12px;
  border-bottom: 1px solid var(--border);
  vertical-align: top;
}

th {
  color: var(--text-muted);
  font-weight: 500;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

td.mono { font-family: var(--mono); font-size: 12px; word-break: break-all; }
td.num { text-align: right; font-family: var(--mono); }
th.num { text-align: right; }

tr:hover { background: rgba(255,255,255,0.02); }

.conf.high { color: var(--green); }
.conf.medium { color: var(--yellow); }
.conf.low { color: var(--red); }

/* Chat */
.chat-layout {
  display: grid;
  grid-template-columns: 260px 1fr;
  gap: 16px;
}

.conversation-list button {
  display: block;
  width: 100%;
  text-align: left;
  padding: 8px 10px;
  margin-bottom: 4px;
  border: 1px solid transparent;
  border-radius: 6px;
  background: transparent;
  color: var(--text);
  cursor: pointer;
  font-size: 13px;
  overflow: hidden;
  white-space: nowrap;
  text-overflow: ellipsis;
}

.conversation-list button:hover { background: rgba(255,255,255,0.04); }
.conversation-list button.active { border-color: var(--accent); color: var(--accent); }

.messages {
  height: 420px;
  overflow-y: auto;
  display: flex;
  flex-direction: column;
  gap: 10px;
  margin-bottom: 12px;
}

.msg {
  max-width: 75%;
  padding: 10px 14px;
  border-radius: var(--radius);
  white-space: pre-wrap;
}

.msg.user { align-self: flex-end; background: var(--accent); color: #fff; }
.msg.assistant { align-self: flex-start; background: var(--bg); border: 1px solid var(--border); }
.msg .time { font-size: 10px; opacity: 0.7; margin-top: 4px; }

.composer { display: flex; gap: 8px; }

/* Forms */
input[type="text"],
input[type="email"],
input[type="password"],
textarea,
select {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 8px 10px;
  font-size: 13px;
  font-family: var(--font);
  width: 100%;
}

input:focus, textarea:focus, select:focus {
  outline: none;
  border-color: var(--accent);
}

.form-row { margin-bottom: 12px; }
.form-row label { display: block; font-size: 12px; color: var(--text-muted); margin-bottom: 4px; }

.login {
  max-width: 380px;
  margin: 80px auto;
}

/* Buttons */
.btn {
  display: inline-flex;
  align-items: center;
  gap: 6px;
  padding: 8px 16px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
  transition: all 0.15s;
}

.btn:hover { border-color: var(--accent); color: var(--accent); }
.btn:disabled { opacity: 0.4; cursor: not-allowed; }
.btn.primary { background: var(--accent); color: #fff; border-color: var(--accent); }
.btn.primary:hover { opacity: 0.85; }
.btn.danger { border-color: var(--red); color: var(--red); }
.btn.danger:hover { background: var(--red); color: #fff; }

.btn-group {
  display: flex;
  gap: 8px;
  margin-top: 16px;
}

/* Toast notification */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 12px 20px;
  border-radius: var(--radius);
  background: var(--green);
  color: #fff;
  font-weight: 500;
  font-size: 13px;
  transform: translateY(80px);
  opacity: 0;
  transition: all 0.3s;
  z-index: 1000;
}

.toast.show { transform: translateY(0); opacity: 1; }
.toast.error { background: var(--red); }

/* Panels / Tabs */
.panel { display: none; }
.panel.active { display: block; }
.hidden { display: none !important; }

/* Empty state */
.empty {
  text-align: center;
  padding: 40px 20px;
  color: var(--text-muted);
}

.empty p { max-width: 400px; margin: 0 auto; }

/* Responsive */
@media (max-width: 768px) {
  .stats-grid { grid-template-columns: 1fr; }
  .chat-layout { grid-template-columns: 1fr; }
  nav { flex-wrap: wrap; }
}
</style>
</head>
<body>
<div class="app">

  <!-- Sign-in -->
  <div class="card login hidden" id="login">
    <h2>Sign in</h2>
    <form id="login-form">
      <div class="form-row"><label for="login-email">Email</label><input type="email" id="login-email" required></div>
      <div class="form-row"><label for="login-password">Password</label><input type="password" id="login-password"></div>
      <button class="btn primary" type="submit">Sign in</button>
    </form>
  </div>

  <div class="hidden" id="dashboard">
    <!-- Header -->
    <header>
      <div>
        <h1><span class="logo">AI</span> Dashboard</h1>
        <div class="subtitle" id="greeting"></div>
      </div>
      <div class="header-right">
        <button class="btn" id="btn-logout">Sign out</button>
      </div>
    </header>

    <!-- Navigation -->
    <nav id="nav"></nav>

    <!-- Models Panel -->
    <div class="panel" id="panel-models">
      <div class="section-head">
        <h2>AI Models</h2>
        <button class="btn primary" id="btn-new-model">Create Model</button>
      </div>

      <div class="card hidden" id="model-form-card">
        <h2>Create New Model</h2>
        <form id="model-form">
          <div class="form-row"><label for="model-name">Name</label><input type="text" id="model-name" required></div>
          <div class="form-row"><label for="model-description">Description</label><textarea id="model-description" rows="3"></textarea></div>
          <div class="form-row"><label for="model-type">Type</label><select id="model-type"></select></div>
          <div class="btn-group">
            <button class="btn primary" type="submit">Create</button>
            <button class="btn" type="button" id="btn-cancel-model">Cancel</button>
          </div>
        </form>
      </div>

      <div class="model-grid" id="model-grid"></div>
      <div class="empty hidden" id="models-empty">
        <p>No models yet. Create your first AI model to get started.</p>
      </div>
    </div>

    <!-- Chat Panel -->
    <div class="panel" id="panel-chat">
      <div class="chat-layout">
        <div class="card">
          <div class="section-head">
            <h3>Conversations</h3>
            <button class="btn" id="btn-new-conversation">New</button>
          </div>
          <div class="conversation-list" id="conversation-list"></div>
        </div>
        <div class="card">
          <div class="messages" id="messages"></div>
          <div class="empty hidden" id="chat-empty">
            <h3>No conversations yet</h3>
            <p>Start a conversation with the AI assistant.</p>
            <button class="btn primary" id="btn-start-chatting">Start Chatting</button>
          </div>
          <form class="composer" id="composer">
            <input type="text" id="chat-input" placeholder="Type your message..." autocomplete="off">
            <button class="btn primary" type="submit" id="btn-send" disabled>Send</button>
          </form>
        </div>
      </div>
    </div>

    <!-- Predictions Panel -->
    <div class="panel" id="panel-predictions">
      <div class="stats-grid">
        <div class="stat-card"><div class="value" id="stat-total">-</div><div class="label">Total Predictions</div></div>
        <div class="stat-card"><div class="value green" id="stat-confidence">-</div><div class="label">Avg Confidence</div></div>
        <div class="stat-card"><div class="value purple" id="stat-week">-</div><div class="label">This Week</div></div>
      </div>
      <div class="card">
        <h2>Recent Predictions</h2>
        <table>
          <thead>
            <tr>
              <th>Model</th>
              <th>Input</th>
              <th>Result</th>
              <th class="num">Confidence</th>
              <th>Date</th>
            </tr>
          </thead>
          <tbody id="predictions-tbody"></tbody>
        </table>
        <div class="empty hidden" id="predictions-empty">
          <p>No predictions yet. Predictions made with your models will appear here.</p>
        </div>
      </div>
    </div>

    <!-- Settings Panel -->
    <div class="panel" id="panel-settings">
      <div class="card">
        <h2>Account Settings</h2>
        <div class="form-row"><label>Email</label><div id="settings-email"></div></div>
        <div class="form-row"><label>Full Name</label><div id="settings-name"></div></div>
      </div>
    </div>
  </div>
</div>

<!-- Toast -->
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------

async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (method !== 'GET') {
    opts.headers['Content-Type'] = 'application/json';
    if (method !== 'DELETE') opts.body = JSON.stringify(body || {});
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (res.status === 401 && path !== '/api/auth/login') {
    showLogin();
  }
  if (!res.ok) throw new Error(data.error || ('HTTP ' + res.status));
  return data;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function esc(s) {
  const d = document.createElement('div');
  d.textContent = s == null ? '' : String(s);
  return d.innerHTML;
}

function show(id, visible) {
  document.getElementById(id).classList.toggle('hidden', !visible);
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

function showLogin() {
  show('dashboard', false);
  show('login', true);
}

function showDashboard(session) {
  show('login', false);
  show('dashboard', true);
  document.getElementById('greeting').textContent = session.greeting;
  document.getElementById('nav').innerHTML = session.tabs.map(t =>
    `<button data-panel="${t.id}">${esc(t.label)}</button>`
  ).join('');
  selectTab(session.tab || 'models');
}

async function init() {
  try {
    const session = await api('GET', '/api/session');
    if (session.signed_in) showDashboard(session); else showLogin();
  } catch (e) {
    toast('Failed to load session: ' + e.message, true);
  }
}

document.getElementById('login-form').addEventListener('submit', async e => {
  e.preventDefault();
  try {
    const session = await api('POST', '/api/auth/login', {
      email: document.getElementById('login-email').value,
      password: document.getElementById('login-password').value,
    });
    document.getElementById('login-password').value = '';
    showDashboard(session);
  } catch (err) {
    toast(err.message, true);
  }
});

document.getElementById('btn-logout').addEventListener('click', async () => {
  await api('POST', '/api/auth/logout');
  showLogin();
});

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (panel) selectTab(panel);
});

function selectTab(panel) {
  document.querySelectorAll('nav button').forEach(b =>
    b.classList.toggle('active', b.dataset.panel === panel));
  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');
  loadPanel(panel);
}

async function loadPanel(panel) {
  try {
    switch (panel) {
      case 'models': return renderModels(await api('GET', '/api/models'));
      case 'chat': return renderChat(await api('GET', '/api/chat'));
      case 'predictions': return renderPredictions(await api('GET', '/api/predictions'));
      case 'settings': return renderSettings(await api('GET', '/api/settings'));
    }
  } catch (e) {
    toast('Failed to load ' + panel + ': ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

let formOpen = false;

function renderModels(state) {
  const select = document.getElementById('model-type');
  if (select.options.length === 0) {
    select.innerHTML = state.model_types.map(t =>
      `<option value="${t.value}">${esc(t.label)}</option>`).join('');
  }
  show('model-form-card', formOpen);
  show('models-empty', state.models.length === 0 && !formOpen);
  document.getElementById('model-grid').innerHTML = state.models.map(m => `
    <div class="card model-card">
      <h3>${esc(m.name)}</h3>
      <div class="type">${esc(m.type_label)}</div>
      <p class="muted">${esc(m.description)}</p>
      <div class="actions">
        <button class="btn" disabled title="Editing is not available yet">Edit</button>
        <button class="btn danger" data-delete="${esc(m.id)}">Delete</button>
      </div>
    </div>
  `).join('');
}

document.getElementById('btn-new-model').addEventListener('click', () => {
  formOpen = true;
  show('model-form-card', true);
  show('models-empty', false);
});

document.getElementById('btn-cancel-model').addEventListener('click', () => {
  formOpen = false;
  loadPanel('models');
});

document.getElementById('model-form').addEventListener('submit', async e => {
  e.preventDefault();
  const res = await api('POST', '/api/models', {
    name: document.getElementById('model-name').value,
    description: document.getElementById('model-description').value,
    model_type: document.getElementById('model-type').value,
  });
  if (res.success) {
    formOpen = false;
    document.getElementById('model-form').reset();
  }
  renderModels(res);
});

document.getElementById('model-grid').addEventListener('click', async e => {
  const id = e.target.dataset.delete;
  if (!id) return;
  if (!confirm('Are you sure you want to delete this model?')) return;
  renderModels(await api('DELETE', '/api/models/' + encodeURIComponent(id) + '?confirm=true'));
});

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

let chatSending = false;

function renderChat(state) {
  document.getElementById('conversation-list').innerHTML = state.conversations.map(c =>
    `<button data-id="${esc(c.id)}" class="${c.id === state.active_id ? 'active' : ''}">${esc(c.title)}</button>`
  ).join('');

  const box = document.getElementById('messages');
  box.innerHTML = state.messages.map(m => `
    <div class="msg ${m.role}">${esc(m.content)}<div class="time">${new Date(m.timestamp).toLocaleTimeString()}</div></div>
  `).join('');
  box.scrollTop = box.scrollHeight;
  show('chat-empty', state.empty);
  updateSendButton(!state.active_id);
  document.getElementById('composer').dataset.disabled = state.active_id ? '' : '1';
}

function updateSendButton(blocked) {
  const input = document.getElementById('chat-input');
  const composer = document.getElementById('composer');
  document.getElementById('btn-send').disabled =
    blocked || chatSending || composer.dataset.disabled === '1' || input.value.trim() === '';
}

document.getElementById('chat-input').addEventListener('input', () => updateSendButton(false));

async function startConversation() {
  renderChat(await api('POST', '/api/chat/conversations'));
}

document.getElementById('btn-new-conversation').addEventListener('click', startConversation);
document.getElementById('btn-start-chatting').addEventListener('click', startConversation);

document.getElementById('conversation-list').addEventListener('click', async e => {
  const id = e.target.dataset.id;
  if (!id) return;
  renderChat(await api('POST', '/api/chat/conversations/' + encodeURIComponent(id) + '/select'));
});

document.getElementById('composer').addEventListener('submit', async e => {
  e.preventDefault();
  const input = document.getElementById('chat-input');
  const message = input.value;
  if (!message.trim() || chatSending) return;

  // Show the message and a typing hint while the reply is pending.
  const box = document.getElementById('messages');
  box.insertAdjacentHTML('beforeend',
    `<div class="msg user">${esc(message)}</div><div class="msg assistant" id="typing">...</div>`);
  box.scrollTop = box.scrollHeight;
  input.value = '';
  chatSending = true;
  updateSendButton(true);

  try {
    const state = await api('POST', '/api/chat/send', { message });
    chatSending = false;
    renderChat(state);
  } catch (err) {
    chatSending = false;
    document.getElementById('typing')?.remove();
    updateSendButton(false);
    toast(err.message, true);
  }
});

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

function renderPredictions(state) {
  document.getElementById('stat-total').textContent = state.stats.total;
  document.getElementById('stat-confidence').textContent = state.avg_confidence_label;
  document.getElementById('stat-week').textContent = state.stats.this_week;

  show('predictions-empty', state.rows.length === 0);
  document.getElementById('predictions-tbody').innerHTML = state.rows.map(p => `
    <tr>
      <td>${esc(p.model_name)}<div class="muted" style="font-size:11px;color:var(--text-muted)">${esc(p.model_type)}</div></td>
      <td class="mono">${esc(p.input_preview)}</td>
      <td class="mono">${esc(p.result_preview)}</td>
      <td class="num conf ${p.bucket}">${esc(p.confidence)}</td>
      <td>${esc(p.date)}</td>
    </tr>
  `).join('');
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

function renderSettings(settings) {
  document.getElementById('settings-email').textContent = settings.email;
  document.getElementById('settings-name').textContent = settings.full_name;
}

init();
</script>
</body>
</html>
"##;
