//! Constant file templates.
//!
//! The runtime build recipe, the proxy configuration, and the landing page
//! carry no substituted values; they are byte-identical across runs.

/// Build recipe for the PHP-FPM runtime image (`php/Dockerfile`).
pub const RUNTIME_DOCKERFILE: &str = r#"FROM php:8.2-fpm

RUN apt-get update \
    && apt-get install -y git zip unzip \
    && rm -rf /var/lib/apt/lists/*

RUN docker-php-ext-install pdo_mysql mysqli

RUN curl -sS https://getcomposer.org/installer | php -- \
    --install-dir=/usr/local/bin --filename=composer

WORKDIR /var/www
"#;

/// Reverse proxy rules (`nginx/conf.d/default.conf`): PHP requests go to
/// the runtime container over FastCGI, everything else is served as static
/// files with a front-controller fallback.
pub const PROXY_CONF: &str = r#"server {
    listen 80;
    server_name localhost;

    root /var/www/public;
    index index.php index.html;

    location / {
        try_files $uri $uri/ /index.php?$query_string;
    }

    location ~ \.php$ {
        fastcgi_pass php:9000;
        fastcgi_index index.php;
        fastcgi_param SCRIPT_FILENAME $document_root$fastcgi_script_name;
        include fastcgi_params;
    }
}
"#;

/// Heading shown on the customized landing page.
pub const LANDING_HEADING: &str = "Your LEMP development environment is ready";

/// The two outbound links on the landing page.
pub const LANDING_LINKS: [&str; 2] = [
    "https://laravel.com/docs",
    "https://docs.docker.com/compose/",
];

/// Replacement for the scaffold's default `welcome.blade.php`.
pub const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>LEMP Development Environment</title>
    <style>
        body {
            font-family: system-ui, sans-serif;
            background: #1a202c;
            color: #edf2f7;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
        }
        .card {
            text-align: center;
            padding: 3rem;
        }
        h1 {
            font-weight: 600;
        }
        a {
            color: #63b3ed;
            margin: 0 1rem;
        }
    </style>
</head>
<body>
    <div class="card">
        <h1>Your LEMP development environment is ready</h1>
        <p>nginx is serving this page through PHP-FPM, and MariaDB is waiting for your first migration.</p>
        <p>
            <a href="https://laravel.com/docs">Laravel documentation</a>
            <a href="https://docs.docker.com/compose/">Compose documentation</a>
        </p>
    </div>
</body>
</html>
"#;
