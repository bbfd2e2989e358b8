pub fn render_index(name: &str) -> String {
    INDEX_HTML.replace("{{NAME}}", &escape_html(name))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habitra</title>
  <style>
    :root {
      --bg: #0f1222;
      --card: rgba(255, 255, 255, 0.06);
      --ink: #eef0ff;
      --muted: #9aa0c3;
      --accent: #6366f1;
      --ok: #10b981;
      --warn: #f59e0b;
      --bad: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    [hidden] {
      display: none !important;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #1c2150, var(--bg) 60%);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1000px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      padding: 22px;
    }

    .welcome {
      letter-spacing: 0.12em;
      color: var(--muted);
      margin: 0;
    }

    .topbar {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    .dashboard {
      display: grid;
      gap: 24px;
    }

    .auth {
      width: min(460px, 100%);
      margin: 0 auto;
    }

    .auth form {
      display: grid;
      gap: 14px;
    }

    .brand {
      letter-spacing: 0.2em;
      margin: 0 0 6px;
    }

    .field {
      display: grid;
      gap: 6px;
    }

    .metrics {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .metric .value {
      font-size: 2.2rem;
      font-weight: 600;
    }

    .metric .unit,
    .label {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .stress-Low { color: var(--ok); }
    .stress-Medium { color: var(--warn); }
    .stress-High { color: var(--bad); }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .habit {
      display: flex;
      align-items: center;
      justify-content: space-between;
      padding: 10px 0;
      border-bottom: 1px solid rgba(255, 255, 255, 0.08);
    }

    .habit.completed .habit-name {
      text-decoration: line-through;
      color: var(--muted);
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 8px 14px;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      color: var(--muted);
    }

    input,
    select,
    textarea {
      width: 100%;
      border-radius: 10px;
      border: 1px solid rgba(255, 255, 255, 0.15);
      background: transparent;
      color: var(--ink);
      padding: 10px;
    }

    .messages {
      max-height: 320px;
      overflow-y: auto;
      display: grid;
      gap: 10px;
      margin-bottom: 12px;
    }

    .message {
      padding: 10px 14px;
      border-radius: 14px;
      max-width: 85%;
    }

    .message.user {
      justify-self: end;
      background: var(--accent);
    }

    .message.ai {
      background: rgba(255, 255, 255, 0.1);
    }

    .status {
      min-height: 1.2em;
      color: var(--bad);
    }
  </style>
</head>
<body>
  <main class="app">
    <section id="login-view" class="card auth" hidden>
      <h1 class="brand">HABITRA</h1>
      <h2>Welcome Back</h2>
      <form id="login-form">
        <label class="field">Email
          <input id="login-email" type="email" placeholder="Enter your email" required />
        </label>
        <label class="field">Password
          <input id="login-password" type="password" placeholder="Enter your password" required />
        </label>
        <button type="submit">Sign In</button>
      </form>
    </section>

    <section id="setup-view" class="card auth" hidden>
      <h1>Complete Your Profile</h1>
      <p class="label">Tell us about your routine so the dashboard can personalize your metrics.</p>
      <form id="setup-form">
        <label class="field">Full Name
          <input id="setup-full-name" placeholder="Enter your full name" required />
        </label>
        <label class="field">Email
          <input id="setup-email" type="email" placeholder="Enter your email" />
        </label>
        <label class="field">Preferred Active Time
          <select id="setup-active-time" required>
            <option value="">Select preferred time</option>
            <option value="morning">Morning</option>
            <option value="afternoon">Afternoon</option>
            <option value="evening">Evening</option>
            <option value="night">Night</option>
          </select>
        </label>
        <label class="field">Daily Availability (hours)
          <select id="setup-daily-availability" required>
            <option value="">Select availability</option>
            <option value="1-2">1-2 hours</option>
            <option value="3-4">3-4 hours</option>
            <option value="5-6">5-6 hours</option>
            <option value="7+">7+ hours</option>
          </select>
        </label>
        <label class="field">Habit Intensity Level
          <select id="setup-habit-intensity" required>
            <option value="">Select intensity</option>
            <option value="beginner">Beginner</option>
            <option value="moderate">Moderate</option>
            <option value="aggressive">Aggressive</option>
          </select>
        </label>
        <label class="field">Stress Sensitivity
          <select id="setup-stress-sensitivity" required>
            <option value="">Select sensitivity</option>
            <option value="low">Low</option>
            <option value="medium">Medium</option>
            <option value="high">High</option>
          </select>
        </label>
        <button type="submit">Complete Setup</button>
      </form>
    </section>

    <div id="dashboard-view" class="dashboard" hidden>
    <header class="topbar">
      <p class="welcome">WELCOME BACK, <span id="name">{{NAME}}</span></p>
      <button id="logout" class="ghost" type="button">Logout</button>
    </header>

    <section class="metrics">
      <div class="card metric">
        <span class="label">Consistency</span>
        <div><span id="consistency" class="value">0</span><span class="unit">%</span></div>
      </div>
      <div class="card metric">
        <span class="label">Streak</span>
        <div><span id="streak" class="value">0</span><span class="unit">avg</span></div>
      </div>
      <div class="card metric">
        <span class="label">Discipline</span>
        <div><span id="discipline" class="value">0</span><span class="unit">/10</span></div>
      </div>
      <div class="card metric">
        <span class="label">Stress</span>
        <div><span id="stress" class="value stress-Low">Low</span></div>
      </div>
    </section>

    <section class="columns">
      <div class="card">
        <h3>Your Habits (<span id="habit-count">0</span>)</h3>
        <form id="add-form">
          <input id="habit-name" placeholder="Enter habit name..." autocomplete="off" />
        </form>
        <div id="habits"></div>
      </div>
      <div class="card">
        <h3>Insights</h3>
        <div id="insights"></div>
      </div>
    </section>

    <section class="card">
      <h3>AI Analysis Assistant</h3>
      <div id="messages" class="messages"></div>
      <form id="chat-form">
        <textarea id="chat-input" rows="2" placeholder="Say hi or ask about your habits..."></textarea>
        <button id="send" type="submit">Send</button>
      </form>
    </section>
    </div>

    <div id="status" class="status"></div>
  </main>
  <script>
    const $ = (id) => document.getElementById(id);
    const setStatus = (message) => { $('status').textContent = message || ''; };

    const api = async (path, options = {}) => {
      const response = await fetch(path, {
        headers: { 'Content-Type': 'application/json' },
        ...options
      });
      if (!response.ok) {
        throw new Error(await response.text() || `request failed: ${response.status}`);
      }
      return response.status === 204 ? null : response.json();
    };

    const renderMetrics = (m) => {
      $('consistency').textContent = m.consistency;
      $('streak').textContent = m.streak;
      $('discipline').textContent = m.discipline;
      $('stress').textContent = m.stress;
      $('stress').className = `value stress-${m.stress}`;
    };

    const renderHabits = (habits) => {
      $('habit-count').textContent = habits.length;
      const list = $('habits');
      list.innerHTML = '';
      if (!habits.length) {
        list.textContent = 'No habits yet. Add one above.';
        return;
      }
      for (const habit of habits) {
        const row = document.createElement('div');
        row.className = `habit ${habit.completed ? 'completed' : ''}`;
        const info = document.createElement('div');
        const name = document.createElement('div');
        name.className = 'habit-name';
        name.textContent = habit.name;
        const streak = document.createElement('div');
        streak.className = 'label';
        streak.textContent = `${habit.streak} day streak`;
        info.append(name, streak);
        const toggle = document.createElement('button');
        toggle.textContent = habit.completed ? '✓' : '○';
        toggle.onclick = () => run(() => api(`/api/habits/${habit.id}/toggle`, { method: 'POST' }));
        const remove = document.createElement('button');
        remove.className = 'ghost';
        remove.textContent = '×';
        remove.onclick = () => run(() => api(`/api/habits/${habit.id}`, { method: 'DELETE' }));
        const actions = document.createElement('div');
        actions.append(toggle, remove);
        row.append(info, actions);
        list.append(row);
      }
    };

    const renderInsights = (insights) => {
      const box = $('insights');
      box.innerHTML = '';
      for (const card of insights.cards) {
        const title = document.createElement('h4');
        title.textContent = card.title;
        const body = document.createElement('p');
        body.textContent = card.body;
        box.append(title, body);
      }
    };

    const appendMessage = (message) => {
      const bubble = document.createElement('div');
      bubble.className = `message ${message.type}`;
      bubble.textContent = message.content;
      $('messages').append(bubble);
      $('messages').scrollTop = $('messages').scrollHeight;
    };

    const refresh = async () => {
      const [habits, metrics, insights] = await Promise.all([
        api('/api/habits'),
        api('/api/metrics'),
        api('/api/insights')
      ]);
      renderHabits(habits);
      renderMetrics(metrics);
      renderInsights(insights);
    };

    const run = async (action) => {
      try {
        setStatus('');
        await action();
        await refresh();
      } catch (err) {
        setStatus(err.message);
      }
    };

    const show = (view) => {
      for (const id of ['login-view', 'setup-view', 'dashboard-view']) {
        $(id).hidden = id !== view;
      }
    };

    // same guards as the dashboard route: login first, then the profile
    const route = async () => {
      const session = await api('/api/session');
      if (!session.loggedIn) {
        show('login-view');
        return;
      }
      if (!session.profileCompleted) {
        show('setup-view');
        return;
      }
      const profile = await api('/api/profile');
      $('name').textContent = profile.fullName;
      show('dashboard-view');
      await refresh();
      $('messages').innerHTML = '';
      const transcript = await api('/api/chat');
      transcript.forEach(appendMessage);
    };

    const navigate = async (action) => {
      try {
        setStatus('');
        await action();
        await route();
      } catch (err) {
        setStatus(err.message);
      }
    };

    $('login-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const email = $('login-email').value.trim();
      const password = $('login-password').value;
      navigate(async () => {
        await api('/api/login', { method: 'POST', body: JSON.stringify({ email, password }) });
        $('login-password').value = '';
        if (!$('setup-email').value) $('setup-email').value = email;
      });
    });

    $('setup-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const profile = {
        fullName: $('setup-full-name').value.trim(),
        email: $('setup-email').value.trim(),
        activeTime: $('setup-active-time').value,
        dailyAvailability: $('setup-daily-availability').value,
        habitIntensity: $('setup-habit-intensity').value,
        stressSensitivity: $('setup-stress-sensitivity').value
      };
      navigate(() => api('/api/profile', { method: 'PUT', body: JSON.stringify(profile) }));
    });

    $('logout').addEventListener('click', () => {
      navigate(async () => {
        await api('/api/logout', { method: 'POST' });
        $('login-form').reset();
        $('setup-form').reset();
        $('messages').innerHTML = '';
      });
    });

    $('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const name = $('habit-name').value.trim();
      if (!name) return;
      $('habit-name').value = '';
      run(() => api('/api/habits', { method: 'POST', body: JSON.stringify({ name }) }));
    });

    $('chat-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const message = $('chat-input').value.trim();
      if (!message) return;
      $('chat-input').value = '';
      appendMessage({ type: 'user', content: message });
      $('send').disabled = true;
      $('send').textContent = 'Thinking...';
      try {
        const result = await api('/api/chat', { method: 'POST', body: JSON.stringify({ message }) });
        appendMessage(result.reply);
      } catch (err) {
        setStatus(err.message);
      } finally {
        $('send').disabled = false;
        $('send').textContent = 'Send';
      }
    });

    $('chat-input').addEventListener('keydown', (event) => {
      if (event.key === 'Enter' && !event.shiftKey) {
        event.preventDefault();
        $('chat-form').requestSubmit();
      }
    });

    navigate(async () => {});
  </script>
</body>
</html>
"#;
